fn main() {
    env_logger::init();

    let app = alcove::default();
    app.run();
}

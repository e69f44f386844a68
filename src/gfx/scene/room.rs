//! Room geometry builders
//!
//! Builds the fixed starting scene: a 10x10 floor, four walls with one of
//! them split around a window opening, a hinged door leaf, marker geometry
//! for both lamps, and the floor alignment grid. All surfaces share the quad
//! vertex pattern used throughout, two triangles listed counter-clockwise.

use std::sync::Arc;

use cgmath::{InnerSpace, Matrix4, Vector3};

use super::object::{DoorState, SceneObject, ShaderKind};
use super::vertex::Vertex3D;
use crate::gfx::resources::TexturePixels;

/// Anchor of the door leaf on the back wall
pub const DOOR_POSITION: [f32; 3] = [3.0, 0.0, -4.9];
/// Hinge offset from the anchor; coincides with the leaf's right vertical edge
pub const DOOR_PIVOT: [f32; 3] = [0.4, 0.0, 0.0];

const WALL_COLOR: [f32; 3] = [0.8, 0.8, 0.6];
const FLOOR_COLOR: [f32; 3] = [0.8, 0.8, 0.6];
const HELPER_COLOR: [f32; 3] = [1.0, 1.0, 0.0];

const QUAD_TEX_COORDS: [[f32; 2]; 6] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
];

/// Two triangles between opposite corners, with one shared normal
fn quad_vertices(
    x1: f32,
    y1: f32,
    z1: f32,
    x2: f32,
    y2: f32,
    z2: f32,
    normal: [f32; 3],
) -> Vec<Vertex3D> {
    let corners = [
        [x1, y1, z1],
        [x2, y1, z2],
        [x2, y2, z2],
        [x1, y1, z1],
        [x2, y2, z2],
        [x1, y2, z1],
    ];
    corners
        .iter()
        .zip(QUAD_TEX_COORDS.iter())
        .map(|(&position, &tex_coords)| Vertex3D {
            position,
            normal,
            tex_coords,
        })
        .collect()
}

pub fn build_floor() -> SceneObject {
    let positions = [
        [-5.0, 0.0, -5.0],
        [5.0, 0.0, 5.0],
        [5.0, 0.0, -5.0],
        [-5.0, 0.0, -5.0],
        [-5.0, 0.0, 5.0],
        [5.0, 0.0, 5.0],
    ];
    let tex_coords = [
        [0.0, 0.0],
        [1.0, 0.0],
        [1.0, 1.0],
        [0.0, 0.0],
        [1.0, 1.0],
        [0.0, 1.0],
    ];
    let vertices = positions
        .iter()
        .zip(tex_coords.iter())
        .map(|(&position, &tex_coords)| Vertex3D {
            position,
            normal: [0.0, 1.0, 0.0],
            tex_coords,
        })
        .collect();

    let mut floor = SceneObject::new("floor", vertices, ShaderKind::Lit);
    floor.color = FLOOR_COLOR;
    floor
}

/// Builds the four walls in index order
///
/// Wall 2 (the left wall at x = -5) is split into four solid segments around
/// a window opening from y 0.8 to 2.2 and z 2 to -1; the window panel itself
/// starts out showing the sky texture.
pub fn build_walls(sky: &Arc<TexturePixels>) -> Vec<SceneObject> {
    let corners: [[f32; 6]; 4] = [
        [-5.0, 0.0, -5.0, 5.0, 3.0, -5.0],
        [5.0, 0.0, 5.0, -5.0, 3.0, 5.0],
        [-5.0, 0.0, 5.0, -5.0, 3.0, -5.0],
        [5.0, 0.0, -5.0, 5.0, 3.0, 5.0],
    ];

    let mut walls = Vec::new();
    for (i, &[x1, y1, z1, x2, y2, z2]) in corners.iter().enumerate() {
        if i == 2 {
            walls.push(wall_segment(-5.0, 0.0, 5.0, -5.0, 0.8, -5.0));
            walls.push(wall_segment(-5.0, 2.2, 5.0, -5.0, 3.0, -5.0));
            walls.push(wall_segment(-5.0, 0.8, 5.0, -5.0, 2.2, 2.0));
            walls.push(wall_segment(-5.0, 0.8, -1.0, -5.0, 2.2, -5.0));
            walls.push(window_panel(-5.0, 0.8, 2.0, -5.0, 2.2, -1.0, sky));
        } else {
            // Face normal from the first triangle's edges
            let u = Vector3::new(x2 - x1, 0.0, z2 - z1);
            let v = Vector3::new(x2 - x1, y2 - y1, z2 - z1);
            let normal = u.cross(v).normalize();

            let vertices = quad_vertices(x1, y1, z1, x2, y2, z2, normal.into());
            let mut wall = SceneObject::new(format!("wall_{}", i), vertices, ShaderKind::Lit);
            wall.color = WALL_COLOR;
            walls.push(wall);
        }
    }
    walls
}

/// Solid piece of the window wall
///
/// The normal is the quad edge crossed with up, negated so it points into the
/// room. It is left unnormalized; the lit shader normalizes per fragment.
fn wall_segment(x1: f32, y1: f32, z1: f32, x2: f32, y2: f32, z2: f32) -> SceneObject {
    let edge = Vector3::new(x2 - x1, y2 - y1, z2 - z1);
    let normal = -edge.cross(Vector3::unit_y());

    let vertices = quad_vertices(x1, y1, z1, x2, y2, z2, normal.into());
    let mut segment = SceneObject::new("wall_segment", vertices, ShaderKind::Lit);
    segment.color = WALL_COLOR;
    segment
}

/// Window panel filling the wall opening
fn window_panel(
    x1: f32,
    y1: f32,
    z1: f32,
    x2: f32,
    y2: f32,
    z2: f32,
    sky: &Arc<TexturePixels>,
) -> SceneObject {
    let dx = x2 - x1;
    let dz = z2 - z1;
    let normal = Vector3::new(dz, 0.0, -dx).normalize();

    let vertices = quad_vertices(x1, y1, z1, x2, y2, z2, normal.into());
    let mut window = SceneObject::new("window", vertices, ShaderKind::Lit);
    window.color = [1.0, 1.0, 1.0];
    window.use_texture = true;
    window.set_texture(Some(sky.clone()));
    window
}

/// Door leaf, 0.8 wide and 2 tall, closed against the back wall
///
/// The leaf spans -0.4 to 0.4 in local x so the hinge offset [`DOOR_PIVOT`]
/// lands exactly on its right vertical edge.
pub fn build_door() -> SceneObject {
    let positions = [
        [-0.4, 0.0, 0.0],
        [0.4, 0.0, 0.0],
        [0.4, 2.0, 0.0],
        [-0.4, 0.0, 0.0],
        [0.4, 2.0, 0.0],
        [-0.4, 2.0, 0.0],
    ];
    let vertices = positions
        .iter()
        .zip(QUAD_TEX_COORDS.iter())
        .map(|(&position, &tex_coords)| Vertex3D {
            position,
            normal: [0.0, 0.0, 1.0],
            tex_coords,
        })
        .collect();

    let mut door = SceneObject::new("door", vertices, ShaderKind::Lit);
    door.color = [0.6, 0.3, 0.1];
    door.position = Some(DOOR_POSITION);
    door.door = Some(DoorState::default());
    door.model_matrix = Matrix4::from_translation(DOOR_POSITION.into());
    door
}

/// Line from above the room center along the directional light's beam
pub fn build_directional_helper(light_direction: [f32; 3]) -> SceneObject {
    let direction = Vector3::from(light_direction).normalize();
    let origin = Vector3::new(0.0, 2.5, 0.0);
    let end = origin + direction * -2.0;

    let vertices = [origin, end]
        .iter()
        .map(|point| Vertex3D {
            position: [point.x, point.y, point.z],
            normal: [0.0; 3],
            tex_coords: [0.0; 2],
        })
        .collect();

    let mut helper = SceneObject::new("directionalHelper", vertices, ShaderKind::Flat);
    helper.color = HELPER_COLOR;
    helper
}

/// Small double-sided marker quad that follows the point light
pub fn build_point_light_helper(position: [f32; 3]) -> SceneObject {
    let positions = [
        [-0.05, -0.05, -0.05],
        [0.05, -0.05, -0.05],
        [0.05, 0.05, -0.05],
        [-0.05, -0.05, -0.05],
        [0.05, 0.05, -0.05],
        [-0.05, 0.05, -0.05],
        [-0.05, -0.05, 0.05],
        [0.05, -0.05, 0.05],
        [0.05, 0.05, 0.05],
        [-0.05, -0.05, 0.05],
        [0.05, 0.05, 0.05],
        [-0.05, 0.05, 0.05],
    ];
    let vertices = positions
        .iter()
        .map(|&position| Vertex3D {
            position,
            normal: [0.0; 3],
            tex_coords: [0.0; 2],
        })
        .collect();

    let mut helper = SceneObject::new("pointLightHelper", vertices, ShaderKind::Lit);
    helper.color = HELPER_COLOR;
    helper.model_matrix = Matrix4::from_translation(position.into());
    helper
}

/// Line grid over the floor plane, one unit apart, slightly above y = 0 to
/// avoid z-fighting with the floor
pub fn build_grid() -> SceneObject {
    let size = 10;
    let mut vertices = Vec::new();
    let mut line = |x1: f32, z1: f32, x2: f32, z2: f32| {
        for position in [[x1, 0.01, z1], [x2, 0.01, z2]] {
            vertices.push(Vertex3D {
                position,
                normal: [0.0; 3],
                tex_coords: [0.0; 2],
            });
        }
    };
    for i in -size..=size {
        let i = i as f32;
        let extent = size as f32;
        line(-extent, i, extent, i);
        line(i, -extent, i, extent);
    }

    let mut grid = SceneObject::new("grid", vertices, ShaderKind::Flat);
    grid.color = [0.3, 0.3, 0.3];
    grid
}

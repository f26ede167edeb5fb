//! The Cornell box, built from the measured room and block coordinates.

use halo_math::Vec3;
use halo_render::{Color, DiffuseLight, Lambertian, Material, Mesh, Primitive};
use std::sync::Arc;

const RED: Color = Color::new(0.63, 0.065, 0.05);
const GREEN: Color = Color::new(0.14, 0.45, 0.091);
const WHITE: Color = Color::new(0.725, 0.71, 0.68);

/// Light is a hair below the ceiling so the two never coincide.
const LIGHT_Y: f32 = 548.7;

/// Ceiling light radiance, a weighted sum of three spectral peaks.
fn light_emission() -> Color {
    8.0 * Color::new(0.747 + 0.058, 0.747 + 0.258, 0.747)
        + 15.6 * Color::new(0.740 + 0.287, 0.740 + 0.160, 0.740)
        + 18.4 * Color::new(0.737 + 0.642, 0.737 + 0.159, 0.737)
}

fn v(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

/// All primitives of the box: five walls, the ceiling light and two blocks.
pub fn cornell_box() -> Vec<Arc<dyn Primitive>> {
    let red: Arc<dyn Material> = Arc::new(Lambertian::new(RED));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(GREEN));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(WHITE));
    let light: Arc<dyn Material> =
        Arc::new(DiffuseLight::new(light_emission()).with_albedo(Color::splat(0.65)));

    let room = Mesh::new(white.clone())
        // floor
        .quad(
            [v(552.8, 0.0, 0.0), v(0.0, 0.0, 0.0), v(0.0, 0.0, 559.2), v(549.6, 0.0, 559.2)],
            Vec3::Y,
        )
        // ceiling
        .quad(
            [v(556.0, 548.8, 0.0), v(556.0, 548.8, 559.2), v(0.0, 548.8, 559.2), v(0.0, 548.8, 0.0)],
            -Vec3::Y,
        )
        // back wall
        .quad(
            [v(549.6, 0.0, 559.2), v(0.0, 0.0, 559.2), v(0.0, 548.8, 559.2), v(556.0, 548.8, 559.2)],
            -Vec3::Z,
        );

    let right = Mesh::new(green).quad(
        [v(0.0, 0.0, 559.2), v(0.0, 0.0, 0.0), v(0.0, 548.8, 0.0), v(0.0, 548.8, 559.2)],
        Vec3::X,
    );
    let left = Mesh::new(red).quad(
        [v(552.8, 0.0, 0.0), v(549.6, 0.0, 559.2), v(556.0, 548.8, 559.2), v(556.0, 548.8, 0.0)],
        -Vec3::X,
    );

    let lamp = Mesh::new(light).quad(
        [
            v(343.0, LIGHT_Y, 227.0),
            v(343.0, LIGHT_Y, 332.0),
            v(213.0, LIGHT_Y, 332.0),
            v(213.0, LIGHT_Y, 227.0),
        ],
        -Vec3::Y,
    );

    let blocks = Mesh::new(white)
        .block(
            [v(130.0, 165.0, 65.0), v(82.0, 165.0, 225.0), v(240.0, 165.0, 272.0), v(290.0, 165.0, 114.0)],
            0.0,
        )
        .block(
            [v(423.0, 330.0, 247.0), v(265.0, 330.0, 296.0), v(314.0, 330.0, 456.0), v(472.0, 330.0, 406.0)],
            0.0,
        );

    [room, right, left, lamp, blocks]
        .into_iter()
        .flat_map(Mesh::into_primitives)
        .collect()
}

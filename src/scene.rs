use glam::{Mat4, Quat, Vec3, Vec4};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Background / fog color, linearized from the page's #050e20 deep blue.
pub const BACKGROUND: Vec3 = Vec3::new(0.0002, 0.0017, 0.0104);
pub const FOG_NEAR: f32 = 25.0;
pub const FOG_FAR: f32 = 35.0;

const GROUND_HALF_EXTENT: f32 = 50.0;
const BOB_AMPLITUDE: f32 = 0.1;
const CUBE_SPIN_RATE: f32 = 0.5;

#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct FrameUniforms {
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub time: f32,
    pub fog_color: Vec3,
    pub fog_near: f32,
    pub fog_far: f32,
    pub _pad: [f32; 3],
}

/// Per-instance data consumed by the forward shader.
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct PropInstance {
    pub model: Mat4,
    /// RGB albedo, w unused.
    pub color: Vec4,
    /// x = shininess exponent, y = specular strength, z = emissive boost.
    pub material: Vec4,
}

#[derive(Clone, Copy, Debug)]
pub struct Orb {
    pub position: Vec3,
    pub radius: f32,
    pub color: Vec3,
    pub shininess: f32,
    pub specular: f32,
    pub bob_amplitude: f32,
    pub bob_phase: f32,
}

/// Static description of the demo scene: a ground plane, two hero orbs, a
/// spinning cube, and a seeded scatter of small accent orbs.
pub struct DemoScene {
    pub orbs: Vec<Orb>,
}

impl DemoScene {
    pub fn generate(seed: u64, accent_count: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut orbs = Vec::with_capacity(accent_count + 2);

        // Hero orbs, mirroring the glossy and mirror-finish pair.
        orbs.push(Orb {
            position: Vec3::new(0.0, 1.0, 0.0),
            radius: 1.0,
            color: Vec3::splat(0.9),
            shininess: 64.0,
            specular: 1.0,
            bob_amplitude: BOB_AMPLITUDE,
            bob_phase: 0.0,
        });
        orbs.push(Orb {
            position: Vec3::new(-2.0, 1.0, 0.0),
            radius: 1.0,
            color: Vec3::splat(0.8),
            shininess: 128.0,
            specular: 1.6,
            bob_amplitude: BOB_AMPLITUDE,
            bob_phase: 1.0,
        });

        for _ in 0..accent_count {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let distance = rng.gen_range(4.0..12.0);
            let (r, g, b) = hsv_to_rgb(rng.gen_range(0.0..1.0), 0.7, 0.9);
            orbs.push(Orb {
                position: Vec3::new(
                    angle.cos() * distance,
                    rng.gen_range(0.2..2.5),
                    angle.sin() * distance,
                ),
                radius: rng.gen_range(0.1..0.35),
                color: Vec3::new(r, g, b),
                shininess: rng.gen_range(16.0..96.0),
                specular: rng.gen_range(0.2..0.8),
                bob_amplitude: rng.gen_range(0.05..0.2),
                bob_phase: rng.gen_range(0.0..std::f32::consts::TAU),
            });
        }

        Self { orbs }
    }

    pub fn ground_instance(&self) -> PropInstance {
        PropInstance {
            model: Mat4::from_scale_rotation_translation(
                Vec3::new(GROUND_HALF_EXTENT, 1.0, GROUND_HALF_EXTENT),
                Quat::IDENTITY,
                Vec3::new(0.0, -0.01, 0.0),
            ),
            color: Vec4::new(0.01, 0.02, 0.06, 0.0),
            material: Vec4::new(32.0, 0.25, 0.0, 0.0),
        }
    }

    pub fn cube_instance(&self, time: f32) -> PropInstance {
        PropInstance {
            model: Mat4::from_scale_rotation_translation(
                Vec3::ONE,
                Quat::from_rotation_y(time * CUBE_SPIN_RATE),
                Vec3::new(2.0, 1.0, 0.0),
            ),
            color: Vec4::new(0.85, 0.85, 0.9, 0.0),
            material: Vec4::new(48.0, 0.7, 0.0, 0.0),
        }
    }

    pub fn orb_instances(&self, time: f32) -> Vec<PropInstance> {
        self.orbs
            .iter()
            .map(|orb| {
                let bob = (time + orb.bob_phase).sin() * orb.bob_amplitude;
                let position = orb.position + Vec3::Y * bob;
                PropInstance {
                    model: Mat4::from_scale_rotation_translation(
                        Vec3::splat(orb.radius),
                        Quat::IDENTITY,
                        position,
                    ),
                    color: orb.color.extend(0.0),
                    material: Vec4::new(orb.shininess, orb.specular, 0.0, 0.0),
                }
            })
            .collect()
    }
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let i = (h * 6.0).floor() as i32;
    let f = h * 6.0 - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    match i % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

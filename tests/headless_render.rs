use blocky_world::camera::Camera;
use blocky_world::framebuffer::{pack_color, unpack_color};
use blocky_world::renderer::{FrameUniforms, Lighting};
use blocky_world::scene::RenderToggles;
use blocky_world::{App, Renderer, SceneConfig, Shape, TextureMode, Transform};
use cgmath::{InnerSpace, Vector3 as Vec3};

const SIZE: usize = 64;

fn frame_for(camera: &Camera, lights_on: bool) -> FrameUniforms {
    FrameUniforms {
        view: *camera.view_matrix(),
        projection: *camera.projection_matrix(),
        camera_pos: camera.position,
        lighting: Lighting::default(),
        lights_on,
    }
}

fn close(a: Vec3<f32>, b: Vec3<f32>) -> bool {
    (a - b).magnitude() < 0.01
}

#[test]
fn unlit_cube_covers_center_and_leaves_background() {
    let camera = Camera::new(Vec3::new(0.0, 0.0, -4.0), Vec3::new(0.0, 0.0, 0.0), 1.0);
    let background = pack_color(Vec3::new(0.15, 0.15, 0.7));
    let mut renderer = Renderer::new(SIZE, SIZE);
    renderer.begin_frame(background, frame_for(&camera, false));

    let mut m = Transform::identity();
    m.translate(-0.5, -0.5, -0.5);
    Shape::cube().with_color(1.0, 0.5, 0.0).with_matrix(m).render(&mut renderer);
    let stats = renderer.finish_frame();

    // 只有朝向相机的一面（2 个三角形）通过剔除
    assert_eq!(stats.triangles_submitted, 12);
    assert_eq!(stats.triangles_rasterized, 2);
    let fb = renderer.framebuffer();
    let center = unpack_color(fb.pixel(SIZE / 2, SIZE / 2).unwrap());
    assert!(close(center, Vec3::new(1.0, 0.5, 0.0)));
    assert_eq!(fb.pixel(0, 0), Some(background));
    assert_eq!(fb.pixel(SIZE - 1, SIZE - 1), Some(background));
}

#[test]
fn normal_debug_mode_shows_face_normal() {
    let camera = Camera::new(Vec3::new(0.0, 0.0, -4.0), Vec3::new(0.0, 0.0, 0.0), 1.0);
    let mut renderer = Renderer::new(SIZE, SIZE);
    renderer.begin_frame(0xFF000000, frame_for(&camera, false));

    let mut m = Transform::identity();
    m.translate(-0.5, -0.5, -0.5);
    Shape::cube()
        .with_matrix(m)
        .with_texture_mode(TextureMode::Normal)
        .render(&mut renderer);
    renderer.finish_frame();

    // 看到的是 z = 0 那一面，法线 (0, 0, -1) -> (0.5, 0.5, 0)
    let center = unpack_color(renderer.framebuffer().pixel(SIZE / 2, SIZE / 2).unwrap());
    assert!(close(center, Vec3::new(0.5, 0.5, 0.0)));
}

#[test]
fn nearer_sphere_occludes_cube_behind_it() {
    let camera = Camera::new(Vec3::new(0.0, 0.0, -6.0), Vec3::new(0.0, 0.0, 0.0), 1.0);
    let mut renderer = Renderer::new(SIZE, SIZE);
    renderer.begin_frame(0xFF000000, frame_for(&camera, false));

    let mut sphere_m = Transform::identity();
    sphere_m.translate(0.0, 0.0, -2.0).scale(0.5, 0.5, 0.5);
    let mut cube_m = Transform::identity();
    cube_m.translate(-1.0, -1.0, 0.0).scale(2.0, 2.0, 2.0);

    // 先画近处的球，再画远处的立方体
    Shape::sphere().with_color(0.0, 1.0, 0.0).with_matrix(sphere_m).render(&mut renderer);
    Shape::cube().with_color(1.0, 0.0, 0.0).with_matrix(cube_m).render(&mut renderer);
    renderer.finish_frame();

    let fb = renderer.framebuffer();
    let center = unpack_color(fb.pixel(SIZE / 2, SIZE / 2).unwrap());
    assert!(close(center, Vec3::new(0.0, 1.0, 0.0)));
    let edge = unpack_color(fb.pixel(SIZE / 2 + 9, SIZE / 2).unwrap());
    assert!(close(edge, Vec3::new(1.0, 0.0, 0.0)));
}

#[test]
fn lighting_brightens_faces_toward_the_light() {
    let camera = Camera::new(Vec3::new(0.0, 3.0, -3.0), Vec3::new(0.0, 0.0, 0.0), 1.0);
    let mut renderer = Renderer::new(SIZE, SIZE);
    let unlit = {
        renderer.begin_frame(0xFF000000, frame_for(&camera, false));
        plain_floor().render(&mut renderer);
        renderer.finish_frame();
        unpack_color(renderer.framebuffer().pixel(SIZE / 2, SIZE / 2).unwrap())
    };
    renderer.begin_frame(0xFF000000, frame_for(&camera, true));
    plain_floor().render(&mut renderer);
    renderer.finish_frame();
    let lit = unpack_color(renderer.framebuffer().pixel(SIZE / 2, SIZE / 2).unwrap());

    assert!(close(unlit, Vec3::new(0.5, 0.5, 0.5)));
    // 点光源在正上方，聚光灯也照在原点附近
    assert!(lit.x > unlit.x);
}

fn plain_floor() -> Shape {
    let mut m = Transform::identity();
    m.translate(0.0, -0.5, 0.0).scale(4.0, 1.0, 4.0).translate(-0.5, -1.0, -0.5);
    Shape::cube()
        .with_color(0.5, 0.5, 0.5)
        .with_matrix(m)
        .with_specular(false)
}

#[test]
fn headless_run_writes_downsampled_pngs() {
    let dir = std::env::temp_dir().join(format!("blocky-world-it-{}", std::process::id()));
    let config = SceneConfig {
        width: 40,
        height: 30,
        ssaa: 2,
        textures: Default::default(),
        ..SceneConfig::default()
    };
    let mut app = App::new(config).unwrap();
    app.toggles = RenderToggles {
        normals: true,
        lights: false,
    };
    let paths = app.run_headless(3, &dir).unwrap();
    assert_eq!(paths.len(), 3);
    assert!(paths[0].ends_with("frame_000.png"));

    let img = image::open(&paths[2]).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (40, 30));
    // 天空盒包住了整个画面，不会留下清屏色
    let clear = [38u8, 38, 179, 255];
    assert!(img.pixels().all(|p| p.0 != clear));
    std::fs::remove_dir_all(&dir).unwrap();
}

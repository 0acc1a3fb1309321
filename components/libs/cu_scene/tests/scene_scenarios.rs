use approx::assert_relative_eq;
use cu_scene::materials::standard_color_id;
use cu_scene::model_cache::ModelMesh;
use cu_scene::topic_errors::{
    INVALID_CUBE_LIST, INVALID_LINE_LIST, INVALID_MARKER_ACTION, INVALID_MARKER_TYPE,
    MESH_FETCH_FAILED,
};
use cu_scene::{
    BlockingModelLoader, MarkerShape, Model, ModelLoader, ModelResponder, Scene, SceneConfig,
    SceneError, SceneEvent, ThreadedModelLoader,
};
use cu_transform::TfTime;
use cu_viz_payloads::{
    ColorRGBA, Header, Marker, MarkerAction, MarkerArray, MarkerKey, MarkerType, Pose,
    Quaternion, RosTime, TfTransform, TransformStamped, Vector3,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const TOPIC: &str = "/visualization_marker";
const BLUE: ColorRGBA = ColorRGBA::new(0.0, 0.0, 1.0, 1.0);

fn map_scene() -> Scene {
    Scene::new(SceneConfig {
        render_frame_id: "map".to_string(),
        fixed_frame_id: "map".to_string(),
        ..Default::default()
    })
}

fn tf(parent: &str, child: &str, sec: u32, x: f64) -> TransformStamped {
    TransformStamped::new(
        parent,
        child,
        RosTime::new(sec, 0),
        TfTransform {
            translation: Vector3::new(x, 0.0, 0.0),
            rotation: Quaternion::IDENTITY,
        },
    )
}

fn marker(ns: &str, id: i32, kind: MarkerType) -> Marker {
    Marker {
        header: Header::new("odom", RosTime::new(0, 0)),
        ns: ns.to_string(),
        id,
        marker_type: kind as i32,
        action: MarkerAction::Add as i32,
        scale: Vector3::new(1.0, 1.0, 1.0),
        color: BLUE,
        ..Default::default()
    }
}

fn secs(s: f64) -> TfTime {
    TfTime::from_secs_f64(s)
}

fn model_named(url: &str) -> Model {
    Model::new(vec![ModelMesh {
        name: url.to_string(),
        positions: vec![],
        indices: vec![],
        material: None,
    }])
}

/// Holds every request until the test answers it.
#[derive(Clone, Default)]
struct DeferredLoader {
    pending: Rc<RefCell<Vec<ModelResponder>>>,
}

impl DeferredLoader {
    fn answer(&self, url: &str) {
        let responder = {
            let mut pending = self.pending.borrow_mut();
            let index = pending.iter().position(|r| r.url() == url).unwrap();
            pending.remove(index)
        };
        responder.respond(Ok(model_named(url)));
    }
}

impl ModelLoader for DeferredLoader {
    fn load(&self, _url: &str, responder: ModelResponder) {
        self.pending.borrow_mut().push(responder);
    }
}

fn deferred_scene() -> (Scene, DeferredLoader) {
    let loader = DeferredLoader::default();
    let scene = Scene::with_model_loader(SceneConfig::default(), Box::new(loader.clone()));
    (scene, loader)
}

fn mesh_marker(url: &str) -> Marker {
    let mut mesh = marker("", 0, MarkerType::MeshResource);
    mesh.mesh_resource = url.to_string();
    mesh
}

fn loaded_mesh_name(scene: &Scene, key: &MarkerKey) -> Option<String> {
    match scene.markers().get(key)?.shape() {
        MarkerShape::MeshResource(mesh) => mesh.model().map(|m| m.meshes[0].name.clone()),
        _ => None,
    }
}

#[test]
fn test_odom_marker_interpolated_in_map() {
    let mut scene = map_scene();
    scene.add_transform_message(&tf("map", "odom", 0, 0.0));
    scene.add_transform_message(&tf("map", "odom", 10, 10.0));

    let mut cube = marker("", 1, MarkerType::Cube);
    cube.header.stamp = RosTime::new(5, 0);
    scene.add_marker_message(TOPIC, &cube);
    scene.tick(secs(5.0));

    let position = scene.marker_world_position("/visualization_marker:1").unwrap();
    assert_relative_eq!(position.x, 5.0, epsilon = 1e-9);
    assert_relative_eq!(position.y, 0.0, epsilon = 1e-9);

    let odom = scene.frame_pose("odom").unwrap();
    assert_relative_eq!(odom.position.x, 5.0, epsilon = 1e-9);
}

#[test]
fn test_frame_locked_follows_current_time() {
    let mut scene = map_scene();
    scene.add_transform_message(&tf("map", "odom", 0, 0.0));
    scene.add_transform_message(&tf("map", "odom", 10, 10.0));

    let mut locked = marker("", 1, MarkerType::Sphere);
    locked.frame_locked = true;
    scene.add_marker_message(TOPIC, &locked);
    let unlocked = marker("", 2, MarkerType::Sphere);
    scene.add_marker_message(TOPIC, &unlocked);

    scene.tick(secs(8.0));
    let locked_x = scene.marker_world_position("/visualization_marker:1").unwrap().x;
    let unlocked_x = scene.marker_world_position("/visualization_marker:2").unwrap().x;
    assert_relative_eq!(locked_x, 8.0, epsilon = 1e-9);
    assert_relative_eq!(unlocked_x, 0.0, epsilon = 1e-9);
}

#[test]
fn test_unresolvable_marker_is_hidden_not_removed() {
    let mut scene = map_scene();
    scene.add_transform_message(&tf("map", "odom", 0, 3.0));
    scene.add_marker_message(TOPIC, &marker("", 1, MarkerType::Cube));
    scene.tick(secs(0.0));
    assert!(scene.marker_world_position("/visualization_marker:1").is_some());

    scene.set_render_frame_id("elsewhere");
    scene.tick(secs(0.0));
    assert!(scene.marker_world_position("/visualization_marker:1").is_none());
    assert_eq!(scene.markers().len(), 1);
    assert!(scene.topic_errors().is_empty());

    // placement is kept while hidden
    let renderable = scene
        .markers()
        .get(&MarkerKey::new(TOPIC, "", 1))
        .unwrap();
    assert_relative_eq!(renderable.world_position().x, 3.0, epsilon = 1e-9);

    scene.set_render_frame_id("map");
    scene.tick(secs(0.0));
    assert!(scene.marker_world_position("/visualization_marker:1").is_some());
}

#[test]
fn test_add_modify_delete_restores_refcount() {
    let mut scene = map_scene();
    let material_id = standard_color_id(&BLUE);
    let before = scene.resources().materials.ref_count(&material_id);

    let mut cube = marker("shapes", 1, MarkerType::Cube);
    scene.add_marker_message(TOPIC, &cube);
    cube.action = MarkerAction::MODIFY as i32;
    cube.pose = Pose::new(Vector3::new(1.0, 2.0, 3.0), Quaternion::IDENTITY);
    scene.add_marker_message(TOPIC, &cube);
    assert_eq!(scene.resources().materials.ref_count(&material_id), before + 1);

    cube.action = MarkerAction::Delete as i32;
    scene.add_marker_message(TOPIC, &cube);
    assert!(scene.markers().is_empty());
    assert!(scene.resources().renderables.is_empty());
    assert_eq!(scene.resources().materials.ref_count(&material_id), before);
}

#[test]
fn test_delete_all_removes_every_namespace() {
    let mut scene = map_scene();
    let array = MarkerArray {
        markers: vec![
            marker("walls", 1, MarkerType::Cube),
            marker("walls", 2, MarkerType::Cube),
            marker("doors", 1, MarkerType::Cylinder),
            marker("", 9, MarkerType::Arrow),
        ],
    };
    scene.add_marker_array(TOPIC, &array);
    scene.add_marker_message("/other", &marker("", 1, MarkerType::Sphere));
    assert_eq!(scene.markers().len(), 5);

    let mut delete_all = marker("", 0, MarkerType::Cube);
    delete_all.action = MarkerAction::DeleteAll as i32;
    scene.add_marker_message(TOPIC, &delete_all);
    assert_eq!(scene.markers().topic(TOPIC).unwrap().len(), 0);
    assert_eq!(scene.markers().len(), 1);
}

#[test]
fn test_invalid_markers_are_rejected() {
    let mut scene = map_scene();

    scene.add_marker_message(TOPIC, &marker("", 1, MarkerType::CubeList));

    let mut odd = marker("", 2, MarkerType::LineList);
    odd.points = vec![Vector3::default(); 3];
    scene.add_marker_message(TOPIC, &odd);

    let mut bad_type = marker("", 3, MarkerType::Cube);
    bad_type.marker_type = 99;
    scene.add_marker_message(TOPIC, &bad_type);

    let mut bad_action = marker("", 4, MarkerType::Cube);
    bad_action.action = 7;
    scene.add_marker_message(TOPIC, &bad_action);

    assert!(scene.markers().is_empty());
    let errors = scene.topic_errors();
    assert_eq!(
        errors.get(TOPIC, INVALID_CUBE_LIST),
        Some("CUBE_LIST marker has no points")
    );
    assert_eq!(
        errors.get(TOPIC, INVALID_LINE_LIST),
        Some("LINE_LIST marker has an odd number of points")
    );
    assert_eq!(
        errors.get(TOPIC, INVALID_MARKER_TYPE),
        Some("Invalid marker type 99")
    );
    assert_eq!(
        errors.get(TOPIC, INVALID_MARKER_ACTION),
        Some("Invalid marker action 7")
    );
    let reported = scene
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, SceneEvent::TopicError { .. }))
        .count();
    assert_eq!(reported, 4);

    scene.remove_topic(TOPIC);
    assert!(scene.topic_errors().is_empty());
}

#[test]
fn test_text_labels_follow_marker() {
    let mut scene = map_scene();
    let mut text = marker("", 5, MarkerType::TextViewFacing);
    text.text = "dock".to_string();
    scene.add_marker_message(TOPIC, &text);
    // same content: no new label
    scene.add_marker_message(TOPIC, &text);
    text.text = "dock 2".to_string();
    scene.add_marker_message(TOPIC, &text);
    text.action = MarkerAction::Delete as i32;
    scene.add_marker_message(TOPIC, &text);

    let events = scene.drain_events();
    let label_id = "/visualization_marker:5".to_string();
    assert_eq!(events.len(), 3);
    assert!(matches!(
        &events[0],
        SceneEvent::ShowLabel { label_id: id, marker } if *id == label_id && marker.text == "dock"
    ));
    assert!(matches!(
        &events[1],
        SceneEvent::ShowLabel { marker, .. } if marker.text == "dock 2"
    ));
    assert_eq!(events[2], SceneEvent::RemoveLabel { label_id });
}

#[test]
fn test_latest_mesh_resource_wins() {
    let loader = BlockingModelLoader::new(|url: &str| Ok::<_, SceneError>(model_named(url)));
    let mut scene = Scene::with_model_loader(SceneConfig::default(), Box::new(loader));
    let key = MarkerKey::new(TOPIC, "robot", 0);

    let mut mesh = marker("robot", 0, MarkerType::MeshResource);
    mesh.mesh_resource = "package://robot/old.dae".to_string();
    scene.add_marker_message(TOPIC, &mesh);
    mesh.mesh_resource = "package://robot/new.dae".to_string();
    scene.add_marker_message(TOPIC, &mesh);
    assert_eq!(loaded_mesh_name(&scene, &key), None);

    scene.tick(secs(0.0));
    assert_eq!(
        loaded_mesh_name(&scene, &key).as_deref(),
        Some("package://robot/new.dae")
    );
}

#[test]
fn test_mesh_load_after_delete_is_noop() {
    let loader = BlockingModelLoader::new(|url: &str| Ok::<_, SceneError>(model_named(url)));
    let mut scene = Scene::with_model_loader(SceneConfig::default(), Box::new(loader));

    let mut mesh = marker("", 0, MarkerType::MeshResource);
    mesh.mesh_resource = "package://robot/base.dae".to_string();
    scene.add_marker_message(TOPIC, &mesh);
    mesh.action = MarkerAction::Delete as i32;
    scene.add_marker_message(TOPIC, &mesh);

    scene.tick(secs(0.0));
    assert!(scene.markers().is_empty());
    assert!(scene.topic_errors().is_empty());
}

#[test]
fn test_mesh_failure_reported_once_loaded() {
    let mut scene = Scene::new(SceneConfig::default());
    let mut mesh = marker("", 0, MarkerType::MeshResource);
    mesh.mesh_resource = "package://robot/base.dae".to_string();
    scene.add_marker_message(TOPIC, &mesh);
    assert!(scene.topic_errors().is_empty());

    scene.tick(secs(0.0));
    let message = scene.topic_errors().get(TOPIC, MESH_FETCH_FAILED).unwrap();
    assert!(message.starts_with("Failed to load mesh resource from \"package://robot/base.dae\""));
    // the renderable stays, without a model
    assert_eq!(scene.markers().len(), 1);
}

#[test]
fn test_threaded_loader_delivers_on_a_later_tick() {
    let loader = ThreadedModelLoader::new(|url: &str| {
        std::thread::sleep(Duration::from_millis(5));
        Ok::<_, SceneError>(model_named(url))
    });
    let mut scene = Scene::with_model_loader(SceneConfig::default(), Box::new(loader));
    let key = MarkerKey::new(TOPIC, "", 0);
    let mut mesh = marker("", 0, MarkerType::MeshResource);
    mesh.mesh_resource = "package://robot/arm.stl".to_string();
    scene.add_marker_message(TOPIC, &mesh);

    let mut loaded = None;
    for tick in 0..400 {
        scene.tick(secs(tick as f64 * 0.01));
        loaded = loaded_mesh_name(&scene, &key);
        if loaded.is_some() {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(loaded.as_deref(), Some("package://robot/arm.stl"));
}

#[test]
fn test_load_for_deleted_mesh_skips_its_replacement() {
    let (mut scene, loader) = deferred_scene();
    let key = MarkerKey::new(TOPIC, "", 0);

    let old = mesh_marker("package://robot/old.dae");
    scene.add_marker_message(TOPIC, &old);
    let mut delete = old.clone();
    delete.action = MarkerAction::Delete as i32;
    scene.add_marker_message(TOPIC, &delete);
    scene.add_marker_message(TOPIC, &mesh_marker("package://robot/new.dae"));

    loader.answer("package://robot/old.dae");
    scene.tick(secs(0.0));
    assert_eq!(loaded_mesh_name(&scene, &key), None);

    loader.answer("package://robot/new.dae");
    scene.tick(secs(0.1));
    assert_eq!(
        loaded_mesh_name(&scene, &key).as_deref(),
        Some("package://robot/new.dae")
    );
}

#[test]
fn test_readded_mesh_with_same_url_loads_once_answered() {
    let (mut scene, loader) = deferred_scene();
    let key = MarkerKey::new(TOPIC, "", 0);

    let mesh = mesh_marker("package://robot/base.dae");
    scene.add_marker_message(TOPIC, &mesh);
    let mut delete = mesh.clone();
    delete.action = MarkerAction::Delete as i32;
    scene.add_marker_message(TOPIC, &delete);
    scene.add_marker_message(TOPIC, &mesh);

    loader.answer("package://robot/base.dae");
    scene.tick(secs(0.0));
    assert_eq!(
        loaded_mesh_name(&scene, &key).as_deref(),
        Some("package://robot/base.dae")
    );
}

#[test]
fn test_superseded_mesh_answering_late_is_ignored() {
    let (mut scene, loader) = deferred_scene();
    let key = MarkerKey::new(TOPIC, "", 0);

    scene.add_marker_message(TOPIC, &mesh_marker("package://robot/old.dae"));
    scene.add_marker_message(TOPIC, &mesh_marker("package://robot/new.dae"));

    loader.answer("package://robot/new.dae");
    scene.tick(secs(0.0));
    assert_eq!(
        loaded_mesh_name(&scene, &key).as_deref(),
        Some("package://robot/new.dae")
    );

    loader.answer("package://robot/old.dae");
    scene.tick(secs(0.1));
    assert_eq!(
        loaded_mesh_name(&scene, &key).as_deref(),
        Some("package://robot/new.dae")
    );
}

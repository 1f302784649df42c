use kestrel_lights::events::PanelEvent;
use kestrel_lights::manager::StatusKind;
use kestrel_lights::scene::TRANSFORM_TYPE;
use kestrel_lights::{
    HeadlessToolkit, LightCategory, LightCollection, LightManager, MemoryScene, NodeRef, PersistenceCodec,
    SceneHost,
};

fn scene_with_lights() -> MemoryScene {
    let mut scene = MemoryScene::new();
    scene.create_light("spotLight").unwrap();
    scene.create_light("pointLight").unwrap();
    let cube = scene.insert_node("pCube1", TRANSFORM_TYPE, None).unwrap();
    scene.insert_node("pCubeShape1", "mesh", Some(cube)).unwrap();
    scene.create_light("ambientLight").unwrap();
    scene
}

fn light_names(lights: &LightCollection<MemoryScene, HeadlessToolkit>) -> Vec<NodeRef> {
    lights.entries().iter().map(|entry| entry.light().clone()).collect()
}

#[test]
fn populate_follows_scene_order_and_is_idempotent() {
    let mut lights = LightCollection::new(scene_with_lights(), HeadlessToolkit::new());
    assert_eq!(lights.populate().unwrap(), 3);
    let first = light_names(&lights);
    assert_eq!(
        first.iter().map(NodeRef::as_str).collect::<Vec<_>>(),
        ["spotLightShape1", "pointLightShape1", "ambientLightShape1"]
    );

    assert_eq!(lights.populate().unwrap(), 3);
    assert_eq!(light_names(&lights), first);
    assert_eq!(lights.toolkit().panel_count(), 3);
}

#[test]
fn delete_twice_is_a_noop() {
    let mut lights = LightCollection::new(scene_with_lights(), HeadlessToolkit::new());
    lights.populate().unwrap();
    let id = lights.entries()[1].id();

    assert!(lights.delete_entry(id).unwrap());
    assert_eq!(lights.len(), 2);
    assert!(!lights.host().exists(&NodeRef::from("pointLight1")));
    assert!(lights.toolkit().panel(id).is_none());

    assert!(!lights.delete_entry(id).unwrap());
    assert_eq!(lights.len(), 2);
}

#[test]
fn externally_deleted_light_is_tolerated() {
    let mut lights = LightCollection::new(scene_with_lights(), HeadlessToolkit::new());
    lights.populate().unwrap();
    let id = lights.entries()[0].id();
    lights.host_mut().delete_node(&NodeRef::from("spotLight1")).unwrap();

    assert!(!lights.set_intensity(id, 50).unwrap());
    assert!(!lights.set_visibility(id, false).unwrap());
    lights.toolkit_mut().queue_color_reply("0 1 0 1");
    assert_eq!(lights.pick_color(id).unwrap(), None);
    lights.on_solo_requested(id, true).unwrap();
    lights.on_solo_requested(id, false).unwrap();
    assert!(lights.delete_entry(id).unwrap(), "entry is removed even though its light is gone");
    assert_eq!(lights.host().light_count(), 2);
}

#[test]
fn manager_round_trip_through_events() {
    let dir = tempfile::tempdir().unwrap();
    let codec = PersistenceCodec::new(dir.path());
    let mut manager = LightManager::new(LightCollection::new(scene_with_lights(), HeadlessToolkit::new()), codec);
    manager.open();
    assert_eq!(manager.collection().len(), 3);

    manager.dispatch(PanelEvent::SaveRequested { name: None });
    let saved = manager.last_saved().expect("light file written").to_path_buf();

    let entry = manager.collection().entries()[0].id();
    manager.dispatch(PanelEvent::DeleteRequested { entry });
    manager.dispatch(PanelEvent::DeleteRequested { entry });
    assert_eq!(manager.collection().len(), 2);

    manager.dispatch(PanelEvent::LoadRequested { path: saved });
    assert_eq!(manager.status().unwrap().kind, StatusKind::Success);
    assert_eq!(manager.collection().len(), 5);
    let spots = manager
        .collection()
        .entries()
        .iter()
        .filter(|entry| entry.category() == LightCategory::Spot)
        .count();
    assert_eq!(spots, 1);
}

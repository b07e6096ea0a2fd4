use std::fs;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tempfile::tempdir;

use niwa::{EditorMode, GardenEditor, schema};

/// Build a plan the hard way: random sculpting and a handful of objects of
/// every registered kind, all within the 20x20 world bounds.
fn populated_editor(seed: u64) -> GardenEditor {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut editor = GardenEditor::new(20, 20);

    for _ in 0..40 {
        let cx = rng.gen_range(0..20);
        let cz = rng.gen_range(0..20);
        let radius = rng.gen_range(0.0..4.0);
        let delta: f32 = rng.gen_range(-0.6..0.6);
        editor.brush.radius_cells = radius;
        editor.brush.strength = delta.abs().max(0.05);
        let world_x = niwa::coords::cell_to_world(cx, 20);
        let world_z = niwa::coords::cell_to_world(cz, 20);
        editor.set_mode(EditorMode::Terrain);
        let ray = niwa::coords::Ray::new(
            glam::Vec3::new(world_x, 40.0, world_z),
            glam::Vec3::new(0.0, -1.0, 0.0),
        );
        let mut ev = niwa::PointerEvent::new(glam::Vec2::new(0.0, 0.0), ray);
        if delta < 0.0 {
            ev = ev.with_shift();
        }
        editor.pointer_down(&ev);
        editor.pointer_up(&ev);
    }

    editor.set_mode(EditorMode::Select);
    for kind in schema::kinds() {
        for _ in 0..3 {
            let x = rng.gen_range(-9.9..9.9);
            let z = rng.gen_range(-9.9..9.9);
            let id = editor.add_object(kind, x, z).expect("registered kind");
            if rng.gen_bool(0.5) {
                editor.update_object_property(id, "height", "1.7");
            }
        }
    }
    editor
}

#[test]
fn file_round_trip_reproduces_the_model() {
    let temp = tempdir().expect("temp dir");
    let path = temp.path().join("garden.json");

    let editor = populated_editor(11);
    editor.save_to_file(&path).expect("saves");

    let mut reloaded = GardenEditor::default();
    let dims = reloaded.load_from_file(&path).expect("loads");
    assert_eq!(dims, (20, 20));

    assert_eq!(reloaded.grid(), editor.grid());
    let originals: Vec<_> = editor.objects().iter().collect();
    let loaded: Vec<_> = reloaded.objects().iter().collect();
    assert_eq!(loaded, originals);

    // Heights survived every random stroke non-negative.
    for z in 0..20 {
        for x in 0..20 {
            assert!(reloaded.grid().height_at(x, z) >= 0.0);
        }
    }
}

#[test]
fn second_save_is_byte_identical() {
    let temp = tempdir().expect("temp dir");
    let first = temp.path().join("first.json");
    let second = temp.path().join("second.json");

    let editor = populated_editor(23);
    editor.save_to_file(&first).expect("saves");

    let mut reloaded = GardenEditor::default();
    reloaded.load_from_file(&first).expect("loads");
    reloaded.save_to_file(&second).expect("saves again");

    let a = fs::read_to_string(&first).expect("read first");
    let b = fs::read_to_string(&second).expect("read second");
    assert_eq!(a, b);
}

#[test]
fn legacy_version_one_file_migrates_to_world_coordinates() {
    let temp = tempdir().expect("temp dir");
    let path = temp.path().join("legacy.json");

    let zeros = vec![vec![0.0f32; 20]; 20];
    let colors = vec![vec!["#6b8e4e"; 20]; 20];
    let doc = serde_json::json!({
        "version": 1,
        "heightData": zeros,
        "colorData": colors,
        "objects": [{ "gridX": 5, "gridZ": 5, "type": "tree" }]
    });
    fs::write(&path, doc.to_string()).expect("write legacy file");

    let mut editor = GardenEditor::default();
    let dims = editor.load_from_file(&path).expect("legacy file loads");
    assert_eq!(dims, (20, 20));

    let tree = editor.objects().iter().next().expect("tree survived");
    assert!((tree.world_x - -4.5).abs() < 1e-6);
    assert!((tree.world_z - -4.5).abs() < 1e-6);
    // The record was schema-completed on the way in.
    let schema = schema::schema_for("tree").unwrap();
    for prop in &schema.properties {
        assert!(tree.params.contains_key(prop.name), "missing {}", prop.name);
    }

    // Saving drops the legacy fields for good.
    let resaved = temp.path().join("resaved.json");
    editor.save_to_file(&resaved).expect("saves");
    let raw = fs::read_to_string(&resaved).expect("read");
    assert!(!raw.contains("gridX"));
    assert!(raw.contains("worldX"));
}

#[test]
fn unknown_kinds_are_skipped_but_the_load_succeeds() {
    let temp = tempdir().expect("temp dir");
    let path = temp.path().join("mixed.json");

    let zeros = vec![vec![0.0f32; 10]; 10];
    let colors = vec![vec!["#6b8e4e"; 10]; 10];
    let doc = serde_json::json!({
        "version": 4,
        "heightData": zeros,
        "colorData": colors,
        "objects": [
            { "id": 1, "type": "tree", "worldX": 0.5, "worldZ": 0.5 },
            { "id": 2, "type": "obelisk", "worldX": 1.5, "worldZ": 1.5 }
        ]
    });
    fs::write(&path, doc.to_string()).expect("write");

    let mut editor = GardenEditor::default();
    editor.load_from_file(&path).expect("loads despite unknown kind");
    assert_eq!(editor.objects().len(), 1);
    assert_eq!(editor.objects().iter().next().unwrap().kind, "tree");
}

#[test]
fn broken_files_leave_the_previous_model_alone() {
    let temp = tempdir().expect("temp dir");

    let mut editor = populated_editor(5);
    let grid_before = editor.grid().clone();
    let count_before = editor.objects().len();

    let garbled = temp.path().join("garbled.json");
    fs::write(&garbled, "{\"version\": 4, \"heightData\": ").expect("write");
    assert!(editor.load_from_file(&garbled).is_err());

    let mismatched = temp.path().join("mismatched.json");
    let doc = serde_json::json!({
        "version": 4,
        "heightData": vec![vec![0.0f32; 10]; 10],
        "colorData": vec![vec!["#6b8e4e"; 10]; 9],
        "objects": []
    });
    fs::write(&mismatched, doc.to_string()).expect("write");
    assert!(editor.load_from_file(&mismatched).is_err());

    let missing = temp.path().join("never-saved.json");
    assert!(editor.load_from_file(&missing).is_err());

    assert_eq!(editor.grid(), &grid_before);
    assert_eq!(editor.objects().len(), count_before);
}

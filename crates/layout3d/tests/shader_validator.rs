//! Parse and validate every WGSL shader with naga.
//!
//! Catches shader syntax and type errors on machines without a GPU, before
//! the engine tests ever request an adapter.

use std::fs;
use std::path::Path;

#[test]
fn test_all_shaders_parse_with_naga() {
    let shader_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/gpu/shaders");
    assert!(
        shader_dir.exists(),
        "Shader directory not found: {:?}",
        shader_dir
    );

    let mut errors = Vec::new();
    let mut shader_count = 0usize;

    for entry in fs::read_dir(&shader_dir).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("wgsl") {
            continue;
        }
        shader_count += 1;
        let source = fs::read_to_string(&path).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();

        let module = match naga::front::wgsl::parse_str(&source) {
            Ok(module) => module,
            Err(e) => {
                errors.push(format!("{}: parse error: {}", name, e));
                continue;
            }
        };

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        if let Err(e) = validator.validate(&module) {
            errors.push(format!("{}: validation error: {:?}", name, e));
        }
    }

    assert!(
        errors.is_empty(),
        "Shader validation failed for {} shader(s):\n{}",
        errors.len(),
        errors.join("\n")
    );
    assert_eq!(shader_count, 7, "expected one shader per kernel");
    println!("validated {} WGSL shaders", shader_count);
}

#[test]
fn test_shaders_declare_expected_entry_points() {
    let shader_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/gpu/shaders");
    let expected: &[(&str, &[&str])] = &[
        ("integrate_3d.wgsl", &["integrate"]),
        ("span_sort.wgsl", &["sort_spans"]),
        ("reshuffle.wgsl", &["reshuffle"]),
        ("identity_map.wgsl", &["clear_identity", "mirror_identity"]),
        (
            "csr_scan.wgsl",
            &["seed_counts", "scan_step", "finalize_offsets"],
        ),
        ("coarse_map.wgsl", &["build_coarse_map"]),
        ("edge_relocate.wgsl", &["relocate_edges"]),
    ];

    for (file, entry_points) in expected {
        let source = fs::read_to_string(shader_dir.join(file)).unwrap();
        let module = naga::front::wgsl::parse_str(&source)
            .unwrap_or_else(|e| panic!("{}: {}", file, e));
        let found: Vec<&str> = module
            .entry_points
            .iter()
            .map(|ep| ep.name.as_str())
            .collect();
        for entry in *entry_points {
            assert!(
                found.contains(entry),
                "{} is missing entry point {} (found {:?})",
                file,
                entry,
                found
            );
        }
    }
}

//! End-to-end generation scenarios over the public API.

use std::path::Path;

use ucgen_artifacts::{
    GenerationOutput, GenerationRequest, MemoryWorkspace, NoWorkspace, PlatformDriver,
    WorkspaceProbe,
};
use ucgen_targets::{
    FederateDescriptor, NetInterfaceBinding, PlatformKind, ProjectManifest, TargetOptions,
    TransportKind,
};

fn generate_in(manifest: &ProjectManifest, workspace: &dyn WorkspaceProbe) -> GenerationOutput {
    let request = GenerationRequest {
        manifest,
        workspace,
        output_root: Path::new("/build/out"),
    };
    PlatformDriver::new().generate(&request).unwrap()
}

fn generate(manifest: &ProjectManifest) -> GenerationOutput {
    generate_in(manifest, &NoWorkspace)
}

fn content<'a>(output: &'a GenerationOutput, path: &str) -> &'a str {
    match output.artifacts.get(path) {
        Some(artifact) => &artifact.content,
        None => panic!("missing artifact {path}"),
    }
}

/// Lines present in `a` but not in `b`, in order.
fn differing_lines<'a>(a: &'a str, b: &str) -> Vec<&'a str> {
    let others: Vec<&str> = b.lines().collect();
    a.lines().filter(|line| !others.contains(line)).collect()
}

fn sicslowpan_federation(names: &[&str]) -> ProjectManifest {
    let mut manifest = ProjectManifest::standalone("Swarm");
    manifest.project.main = Some("Main".into());
    manifest.target =
        TargetOptions::for_platform(PlatformKind::Zephyr).with_transport(TransportKind::Sicslowpan);
    manifest.federates = names
        .iter()
        .enumerate()
        .map(|(i, name)| FederateDescriptor::new(*name, i))
        .collect();
    manifest
}

#[test]
fn standalone_native_descriptor() {
    let mut manifest = ProjectManifest::standalone("Blink");
    manifest.project.main = Some("Main".into());
    manifest.target = TargetOptions::for_platform(PlatformKind::Native);

    let output = generate(&manifest);
    let cmake = content(&output, "Blink/CMakeLists.txt");
    assert!(cmake.contains("project(Main)\n"));
    assert!(cmake.contains("set(LF_MAIN Main)\n"));
    assert!(cmake.contains("set(LF_MAIN_TARGET Blink)\n"));
    assert!(cmake.contains("add_executable(${LF_MAIN_TARGET})\n"));
    assert!(!cmake.contains("FEDERATE"));
    assert!(!cmake.contains("BOARD"));
    assert!(output.artifacts.get("Blink/bin/Blink").is_none());
}

#[test]
fn sicslowpan_federates_get_distinct_addresses() {
    let output = generate(&sicslowpan_federation(&["f0", "f1"]));
    let addresses: Vec<String> = output
        .units
        .iter()
        .map(|u| u.address.unwrap().to_string())
        .collect();
    assert_eq!(addresses, ["fd01::1", "fd01::2"]);
    assert!(addresses.iter().all(|a| a.starts_with("fd01::")));

    let prj0 = content(&output, "Swarm/f0/prj_lf.conf");
    let prj1 = content(&output, "Swarm/f1/prj_lf.conf");
    assert_eq!(
        differing_lines(prj0, prj1),
        ["CONFIG_NET_CONFIG_MY_IPV6_ADDR=\"fd01::1\""]
    );
    assert_eq!(
        differing_lines(prj1, prj0),
        ["CONFIG_NET_CONFIG_MY_IPV6_ADDR=\"fd01::2\""]
    );

    let cmake0 = content(&output, "Swarm/f0/CMakeLists.txt");
    let cmake1 = content(&output, "Swarm/f1/CMakeLists.txt");
    assert_eq!(
        differing_lines(cmake0, cmake1),
        [
            "project(Main_f0)",
            "set(PROJECT_ROOT /build/out/Swarm/f0/..)",
            "set(FEDERATE f0)",
        ]
    );

    let main0 = content(&output, "Swarm/f0/lf_main.c");
    let main1 = content(&output, "Swarm/f1/lf_main.c");
    assert!(differing_lines(main0, main1).iter().all(|l| l.contains("f0")));
    assert!(output.artifacts.get("Swarm/bin/Swarm").is_none());
}

#[test]
fn declared_address_never_reissued() {
    let mut manifest = sicslowpan_federation(&["f0", "f1", "f2", "f3"]);
    manifest.federates[2] = FederateDescriptor::new("f2", 2)
        .with_interface(NetInterfaceBinding::new("fd01::9", TransportKind::Sicslowpan));

    let output = generate(&manifest);
    let assigned: Vec<(String, String)> = output
        .units
        .iter()
        .map(|u| (u.federate.clone().unwrap(), u.address.unwrap().to_string()))
        .collect();
    let holders: Vec<&str> = assigned
        .iter()
        .filter(|(_, address)| address == "fd01::9")
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(holders, ["f2"]);
    // Allocation resumes past the declared address.
    let others: Vec<&str> = assigned
        .iter()
        .filter(|(name, _)| name != "f2")
        .map(|(_, address)| address.as_str())
        .collect();
    assert_eq!(others, ["fd01::a", "fd01::b", "fd01::c"]);
}

#[test]
fn declared_address_inside_allocation_range() {
    let mut manifest = sicslowpan_federation(&["f0", "f1", "f2"]);
    manifest.federates[0] = FederateDescriptor::new("f0", 0)
        .with_interface(NetInterfaceBinding::new("FD01:0:0:0::2", TransportKind::Sicslowpan));
    let output = generate(&manifest);
    let addresses: Vec<String> = output
        .units
        .iter()
        .map(|u| u.address.unwrap().to_string())
        .collect();
    assert_eq!(addresses, ["fd01::2", "fd01::3", "fd01::4"]);
}

#[test]
fn pico_board_fragment_follows_base_on_every_platform() {
    let platforms = [
        (PlatformKind::Native, "lf.conf"),
        (PlatformKind::FreeRtos, "lf.conf"),
        (PlatformKind::Riot, "app.config"),
        (PlatformKind::EspIdf, "sdkconfig.defaults"),
        (PlatformKind::Zephyr, "prj_lf.conf"),
    ];
    for (platform, file) in platforms {
        let mut manifest = ProjectManifest::standalone("Blink");
        manifest.target = TargetOptions::for_platform(platform).with_board("w5500_evb_pico");
        let output = generate(&manifest);
        let config = content(&output, &format!("Blink/{file}"));
        let marker = config
            .find("# Pico specific configuration")
            .unwrap_or_else(|| panic!("{platform}: no board fragment"));
        let entropy = config.find("CONFIG_ENTROPY_GENERATOR=y").unwrap();
        let random = config.find("CONFIG_TEST_RANDOM_GENERATOR=y").unwrap();
        assert!(marker < entropy && entropy < random, "{platform}");
        assert!(config[..marker].contains("CONFIG_"), "{platform}: base missing");
        assert!(config.ends_with("CONFIG_TEST_RANDOM_GENERATOR=y\n"), "{platform}");
    }
}

#[test]
fn unknown_board_adds_nothing() {
    let mut manifest = ProjectManifest::standalone("Blink");
    manifest.target = TargetOptions::for_platform(PlatformKind::Zephyr).with_board("nucleo_f446re");
    let output = generate(&manifest);
    assert!(!content(&output, "Blink/prj_lf.conf").contains("Pico"));
    let cmake = content(&output, "Blink/CMakeLists.txt");
    assert!(cmake.contains("set(BOARD \"nucleo_f446re\")"));
}

#[test]
fn workspace_kconfig_and_pass_through_files() {
    let workspace = MemoryWorkspace::new()
        .with_file("Kconfig", "config MY_SENSOR\n\tbool \"sensor\"\n")
        .with_file("prj.conf", "CONFIG_GPIO=y\n")
        .with_file("app.overlay", "/ { };\n");
    let mut manifest = ProjectManifest::standalone("Blink");
    manifest.target = TargetOptions::for_platform(PlatformKind::Zephyr);
    let output = generate_in(&manifest, &workspace);

    let kconfig = content(&output, "Blink/Kconfig");
    assert!(kconfig.starts_with("source \"Kconfig.zephyr\""));
    let marker = kconfig.find("# ---- User-provided Kconfig overlay ----").unwrap();
    assert!(kconfig[..marker].contains("config LF_TCP_IP_CHANNEL_STACK_SIZE"));
    assert!(kconfig.ends_with("config MY_SENSOR\n\tbool \"sensor\"\n"));
    assert_eq!(content(&output, "Blink/prj.conf"), "CONFIG_GPIO=y\n");
    assert_eq!(content(&output, "Blink/app.overlay"), "/ { };\n");

    let bare = generate(&manifest);
    assert!(!content(&bare, "Blink/Kconfig").contains("User-provided"));
    assert!(bare.artifacts.get("Blink/prj.conf").is_none());
}

#[test]
fn combined_config_merges_workspace_overlay() {
    let workspace = MemoryWorkspace::new().with_file("lf.conf", "CONFIG_EXTRA=y");
    let manifest = ProjectManifest::standalone("Blink");
    let output = generate_in(&manifest, &workspace);
    let config = content(&output, "Blink/lf.conf");
    let generated = config.find("LF_EVENT_QUEUE_SIZE").unwrap();
    let overlay = config.find("# ---- User-provided lf.conf overlay ----").unwrap();
    assert!(generated < overlay);
    assert!(config.ends_with("CONFIG_EXTRA=y\n"));
}

#[test]
fn generation_is_deterministic() {
    let manifest = sicslowpan_federation(&["f0", "f1", "f2"]);
    let a = generate(&manifest);
    let b = generate(&manifest);
    assert_eq!(a.artifacts, b.artifacts);
    assert_eq!(a.units, b.units);
}

#[test]
fn native_federation_writes_launch_script() {
    let mut manifest = ProjectManifest::standalone("Pair");
    manifest.target = TargetOptions::for_platform(PlatformKind::Native);
    manifest.federates = vec![FederateDescriptor::new("src", 0), FederateDescriptor::new("dst", 1)];
    let output = generate(&manifest);

    let dir = tempfile::tempdir().unwrap();
    let written = output.write_all(dir.path()).unwrap();
    assert_eq!(written.len(), output.artifacts.len());

    let script = std::fs::read_to_string(dir.path().join("Pair/bin/Pair")).unwrap();
    assert!(script.starts_with("#!/usr/bin/env bash\n"));
    assert!(script.contains("\"$SCRIPT_DIR/Pair_src\""));
    assert!(script.contains("\"$SCRIPT_DIR/Pair_dst\""));
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(dir.path().join("Pair/bin/Pair"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    let cmake = std::fs::read_to_string(dir.path().join("Pair/src/CMakeLists.txt")).unwrap();
    assert!(cmake.contains("set(LF_MAIN_TARGET Pair_src)"));
    assert!(cmake.contains("install(TARGETS ${LF_MAIN_TARGET} DESTINATION ${PROJECT_ROOT}/bin)"));
}

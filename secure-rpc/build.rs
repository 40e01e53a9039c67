fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use the vendored protoc so the build does not depend on a system install.
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);

    println!("cargo:rerun-if-changed=proto/agent.proto");

    // The server half is generated too, for test doubles of the agent.
    tonic_build::configure()
        .build_server(true)
        .type_attribute(".agent", "#[derive(serde::Serialize, serde::Deserialize)]")
        .compile_protos(&["proto/agent.proto"], &["proto"])?;

    Ok(())
}

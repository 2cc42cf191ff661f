//! Build script for generating C headers.

fn main() {
    println!("cargo:rerun-if-changed=src/ffi.rs");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let crate_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR must be set by Cargo");
    let config_path = std::path::Path::new(&crate_dir).join("cbindgen.toml");
    let config = cbindgen::Config::from_file(config_path).unwrap_or_default();

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            // OUT_DIR keeps `cargo publish` working; include/ is for local C builds.
            bindings.write_to_file(std::path::Path::new(&out_dir).join("u_eda.h"));

            let include_dir = std::path::Path::new(&crate_dir).join("include");
            if std::fs::create_dir_all(&include_dir).is_ok() {
                bindings.write_to_file(include_dir.join("u_eda.h"));
            }
        }
        Err(e) => println!("cargo:warning=C header not generated: {e}"),
    }
}

use prost::Message;
use std::env;
use std::fs;
use std::path::PathBuf;
use tonic_build::manual::{Builder, Method, Service};

const PROTO_DIR: &str = "../proto";
const PROTO_FILE: &str = "benchmark.proto";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    let ping_service = Service::builder()
        .name("PingService")
        .package("benchmark")
        .method(
            Method::builder()
                .name("ping")
                .route_name("Ping")
                .input_type("crate::proto::PingRequest")
                .output_type("crate::proto::PingResponse")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .build();
    Builder::new().compile(&[ping_service]);

    // Descriptor set served by gRPC reflection, compiled without protoc.
    let descriptor_set = protox::compile([PROTO_FILE], [PROTO_DIR])?;
    fs::write(
        out_dir.join("benchmark_descriptor.bin"),
        descriptor_set.encode_to_vec(),
    )?;

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={PROTO_DIR}/{PROTO_FILE}");
    Ok(())
}

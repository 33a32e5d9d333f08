//! Wire schema of the `benchmark.PingService` RPC.
//!
//! The messages mirror `proto/benchmark.proto`; the client and server stubs and
//! the encoded descriptor set are generated by the build script.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PingRequest {
    #[prost(string, tag = "1")]
    pub message: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PingResponse {
    #[prost(string, tag = "1")]
    pub reply: ::prost::alloc::string::String,
    /// Milliseconds since the Unix epoch.
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
}

include!(concat!(env!("OUT_DIR"), "/benchmark.PingService.rs"));

/// Encoded `FileDescriptorSet` of `proto/benchmark.proto`, registered with gRPC reflection.
pub const FILE_DESCRIPTOR_SET: &[u8] =
    include_bytes!(concat!(env!("OUT_DIR"), "/benchmark_descriptor.bin"));

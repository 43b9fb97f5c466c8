use arcglyph_atlas::AtlasId;

#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("Request Adapter Error: {0}")]
    RequestAdapterError(#[from] wgpu::RequestAdapterError),
    #[error("Request Device Error: {0}")]
    RequestDeviceError(#[from] wgpu::RequestDeviceError),
    #[error("Cannot upload a mesh without geometry")]
    EmptyMesh,
    #[error("No atlas texture for atlas {0:?}")]
    MissingAtlasTexture(AtlasId),
    #[error("Buffer Map Error: {0}")]
    BufferMapError(#[from] wgpu::BufferAsyncError),
    #[error("Timed out waiting for readback")]
    ReadbackTimeout,
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeleneError {
    #[error("GPU device error: {0}")]
    GpuDevice(String),

    #[error("Shader compilation failed: {0}")]
    ShaderCompilation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Out of memory: {0}")]
    OutOfMemory(String),
}

pub type Result<T> = std::result::Result<T, SeleneError>;

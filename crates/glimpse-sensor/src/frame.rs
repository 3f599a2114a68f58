/// A captured grayscale frame, opaque to the identity pipeline.
#[derive(Clone)]
pub struct Frame {
    /// Grayscale pixel data (width * height bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Monotonically increasing per source.
    pub sequence: u32,
}

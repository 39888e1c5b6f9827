/// MIME type the screen capture is served with.
pub const MIME_TYPE: &str = "image/png";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Raw display capture as returned by the instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    payload: Vec<u8>,
}

impl Screenshot {
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.payload
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    /// Some firmware answers the PNG query with BMP data; callers may want
    /// to warn about it.
    pub fn has_png_signature(&self) -> bool {
        self.payload.starts_with(&PNG_SIGNATURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_png_signature() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(b"IHDR");
        assert!(Screenshot::new(png).has_png_signature());
        assert!(!Screenshot::new(b"BM6\x00".to_vec()).has_png_signature());
        assert!(!Screenshot::new(Vec::new()).has_png_signature());
    }
}

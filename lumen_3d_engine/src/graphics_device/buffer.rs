/// Buffer and vertex layout types for the graphics device

/// Buffer usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Vertex buffer
    Vertex,
    /// Index buffer (32-bit indices)
    Index,
}

/// Scalar type of a vertex attribute component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Float32,
    Int32,
}

impl AttributeType {
    /// Size in bytes of one component
    pub fn size_bytes(&self) -> u32 {
        match self {
            AttributeType::Float32 => 4,
            AttributeType::Int32 => 4,
        }
    }
}

/// One vertex attribute inside an interleaved vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Shader attribute slot
    pub location: u32,
    pub kind: AttributeType,
    /// Number of components (1..=4)
    pub components: u32,
    /// Byte offset from the start of the vertex
    pub offset: u32,
}

impl VertexAttribute {
    pub fn size_bytes(&self) -> u32 {
        self.kind.size_bytes() * self.components
    }
}

/// Interleaved vertex layout
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    /// Bytes between consecutive vertices
    pub stride: u32,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Parse a compact format descriptor such as `"f3f2f3f4"`
    ///
    /// Each token is a type letter (`f` = f32, `i` = i32) followed by a
    /// component count 1..=4. Attributes get consecutive locations starting at
    /// 0 and sequential byte offsets; the stride is the total size.
    pub fn from_format(descriptor: &str) -> crate::error::Result<Self> {
        let bytes = descriptor.as_bytes();
        if bytes.is_empty() || bytes.len() % 2 != 0 {
            return Err(crate::error::Error::InvalidResource(format!(
                "vertex format '{}' is not a sequence of <type><count> tokens",
                descriptor
            )));
        }

        let mut attributes = Vec::with_capacity(bytes.len() / 2);
        let mut offset = 0;
        for (location, token) in bytes.chunks_exact(2).enumerate() {
            let kind = match token[0] {
                b'f' => AttributeType::Float32,
                b'i' => AttributeType::Int32,
                other => {
                    return Err(crate::error::Error::InvalidResource(format!(
                        "vertex format '{}': unknown type '{}'",
                        descriptor, other as char
                    )))
                }
            };
            let components = match token[1] {
                c @ b'1'..=b'4' => (c - b'0') as u32,
                other => {
                    return Err(crate::error::Error::InvalidResource(format!(
                        "vertex format '{}': bad component count '{}'",
                        descriptor, other as char
                    )))
                }
            };
            let attribute = VertexAttribute { location: location as u32, kind, components, offset };
            offset += attribute.size_bytes();
            attributes.push(attribute);
        }

        Ok(Self { stride: offset, attributes })
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;

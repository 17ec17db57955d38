use crate::foundation::core::Span;
use crate::foundation::error::{BridgeError, BridgeResult};

/// Bounds-checked little-endian reader over engine linear memory.
///
/// A view is cheap to build and must be rebuilt after any engine call that may grow or move
/// memory; it never outlives the borrow of the slice it was created from.
#[derive(Clone, Copy, Debug)]
pub struct MemoryView<'m> {
    mem: &'m [u8],
    base: usize,
    len: usize,
}

impl<'m> MemoryView<'m> {
    /// View the whole of `mem`.
    pub fn new(mem: &'m [u8]) -> Self {
        Self {
            mem,
            base: 0,
            len: mem.len(),
        }
    }

    /// Narrow the view to `[offset, offset + len)` relative to this view.
    pub fn window(&self, offset: u32, len: u32) -> BridgeResult<Self> {
        let start = self.checked_range(offset as usize, len as usize)?;
        Ok(Self {
            mem: self.mem,
            base: start,
            len: len as usize,
        })
    }

    /// Absolute offset of this view inside linear memory.
    pub fn base(&self) -> u32 {
        self.base as u32
    }

    /// Size of this view in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return `true` for an empty view.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn checked_range(&self, offset: usize, size: usize) -> BridgeResult<usize> {
        let end = offset
            .checked_add(size)
            .ok_or_else(|| BridgeError::memory("offset overflow"))?;
        if end > self.len {
            return Err(BridgeError::memory(format!(
                "read of {size} bytes at +{offset} exceeds view of {} bytes at {}",
                self.len, self.base
            )));
        }
        Ok(self.base + offset)
    }

    fn bytes<const N: usize>(&self, offset: u32) -> BridgeResult<[u8; N]> {
        let start = self.checked_range(offset as usize, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.mem[start..start + N]);
        Ok(out)
    }

    /// Read a `u8` at `offset`.
    pub fn u8_at(&self, offset: u32) -> BridgeResult<u8> {
        Ok(self.bytes::<1>(offset)?[0])
    }

    /// Read a little-endian `u32` at `offset`.
    pub fn u32_at(&self, offset: u32) -> BridgeResult<u32> {
        Ok(u32::from_le_bytes(self.bytes::<4>(offset)?))
    }

    /// Read a little-endian `f32` at `offset`.
    pub fn f32_at(&self, offset: u32) -> BridgeResult<f32> {
        Ok(f32::from_le_bytes(self.bytes::<4>(offset)?))
    }

    /// Read a `(ptr, len)` pair stored at two independent offsets.
    pub fn span_at(&self, ptr_offset: u32, len_offset: u32) -> BridgeResult<Span> {
        Ok(Span::new(self.u32_at(ptr_offset)?, self.u32_at(len_offset)?))
    }

    /// Decode a UTF-8 string addressed by an absolute span.
    ///
    /// Null spans decode to the empty string. Strings are length-prefixed, not NUL-terminated.
    pub fn string(&self, span: Span) -> BridgeResult<String> {
        read_string(self.mem, span)
    }
}

/// Decode a UTF-8 string at an absolute span of `mem`, validating it against the current size.
pub fn read_string(mem: &[u8], span: Span) -> BridgeResult<String> {
    if span.is_null() {
        return Ok(String::new());
    }
    let start = span.ptr as usize;
    let end = start
        .checked_add(span.len as usize)
        .ok_or_else(|| BridgeError::memory("string span overflow"))?;
    let bytes = mem.get(start..end).ok_or_else(|| {
        BridgeError::memory(format!(
            "string span {}+{} exceeds memory of {} bytes",
            span.ptr,
            span.len,
            mem.len()
        ))
    })?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| BridgeError::memory(format!("string at {} is not UTF-8: {e}", span.ptr)))
}

/// Decode a NUL-terminated string starting at `ptr`.
pub fn read_cstr(mem: &[u8], ptr: u32) -> BridgeResult<String> {
    let start = ptr as usize;
    let tail = mem
        .get(start..)
        .ok_or_else(|| BridgeError::memory(format!("c-string pointer {ptr} out of bounds")))?;
    let len = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| BridgeError::memory(format!("c-string at {ptr} is not terminated")))?;
    read_string(mem, Span::new(ptr, len as u32))
}

#[cfg(test)]
#[path = "../../tests/unit/memory/reader.rs"]
mod tests;

/// Incremental UTF-8 decoder for block-wise reads.
///
/// A block boundary may fall inside a multi-byte character. The incomplete
/// tail (at most 3 bytes) is held in `carry` and prefixed onto the next block,
/// so concatenating every decoded block equals decoding the whole input at once.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    /// Bytes of a character split by the previous block boundary.
    carry: Vec<u8>,
    /// Absolute offset of the first byte not yet emitted as text.
    offset: u64,
    /// Reused when `carry` has to be joined with a block.
    scratch: Vec<u8>,
}

impl Utf8Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `block`, returning every complete character it finishes.
    ///
    /// # Errors
    ///
    /// - [`DecodeError`](crate::errors::DecodeError) at the absolute offset of
    ///   the first invalid sequence.
    pub fn decode(&mut self, block: &[u8]) -> Result<String, crate::errors::DecodeError> {
        let mut scratch = std::mem::take(&mut self.scratch);
        let result = self.step(block, &mut scratch).map(str::to_owned);

        self.scratch = scratch;

        result
    }

    /// Same bookkeeping as [`Utf8Decoder::decode`] without building a string.
    ///
    /// # Errors
    ///
    /// - [`DecodeError`](crate::errors::DecodeError) at the absolute offset of
    ///   the first invalid sequence.
    pub fn validate(&mut self, block: &[u8]) -> Result<(), crate::errors::DecodeError> {
        let mut scratch = std::mem::take(&mut self.scratch);
        let result = self.step(block, &mut scratch).map(|_| ());

        self.scratch = scratch;

        result
    }

    /// Checks that the input did not end in the middle of a character.
    ///
    /// # Errors
    ///
    /// - [`DecodeError`](crate::errors::DecodeError) pointing at the start of
    ///   the truncated sequence.
    pub fn finish(&self) -> Result<(), crate::errors::DecodeError> {
        if self.carry.is_empty() {
            Ok(())
        } else {
            Err(crate::errors::DecodeError {
                byte_offset: self.offset,
            })
        }
    }

    /// Bytes currently held over from the previous block.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.carry
    }

    fn step<'a>(
        &mut self,
        block: &'a [u8],
        scratch: &'a mut Vec<u8>,
    ) -> Result<&'a str, crate::errors::DecodeError> {
        let bytes: &'a [u8] = if self.carry.is_empty() {
            block
        } else {
            scratch.clear();
            scratch.append(&mut self.carry);
            scratch.extend_from_slice(block);
            scratch
        };
        let base = self.offset;

        match std::str::from_utf8(bytes) {
            Ok(text) => {
                self.offset += bytes.len() as u64;

                Ok(text)
            }
            // Input ends mid-character: keep the tail for the next block.
            Err(err) if err.error_len().is_none() => {
                let (head, tail) = bytes.split_at(err.valid_up_to());

                self.carry.extend_from_slice(tail);
                self.offset += head.len() as u64;

                std::str::from_utf8(head)
                    .map_err(|_| crate::errors::DecodeError { byte_offset: base })
            }
            Err(err) => Err(crate::errors::DecodeError {
                byte_offset: base + err.valid_up_to() as u64,
            }),
        }
    }
}

//! Incremental AES-256-CBC for streams
//!
//! [`StreamEncryptor`] and [`StreamDecryptor`] accept input in arbitrary
//! pieces and keep the CBC chaining state between calls, so memory stays
//! bounded by the chunk size regardless of the stream length. The output
//! layout is identical to [`crate::symmetric::Cipher`]: `IV ‖ ciphertext`.

use crate::{
    CryptoError, Result,
    keys::SymmetricKey,
    symmetric::{self, Aes256CbcDec, Aes256CbcEnc, BLOCK_SIZE, IV_SIZE, Iv},
};
use cbc::cipher::{
    BlockDecryptMut, BlockEncryptMut, block_padding::Pkcs7, generic_array::GenericArray,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Encrypts a stream piece by piece
pub struct StreamEncryptor {
    cipher: Aes256CbcEnc,
    pending: Vec<u8>,
}

impl StreamEncryptor {
    /// Start a new stream under `key` and `iv`
    pub fn new(key: &SymmetricKey, iv: &Iv) -> Result<Self> {
        Ok(Self {
            cipher: symmetric::encryptor(key, iv)?,
            pending: Vec::with_capacity(BLOCK_SIZE),
        })
    }

    /// Feed plaintext, returning every ciphertext block that is complete so far
    pub fn update(&mut self, data: &[u8]) -> Vec<u8> {
        self.pending.extend_from_slice(data);
        let full = self.pending.len() - self.pending.len() % BLOCK_SIZE;
        let mut out: Vec<u8> = self.pending.drain(..full).collect();
        for block in out.chunks_exact_mut(BLOCK_SIZE) {
            self.cipher.encrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        out
    }

    /// Pad the remainder and return the last ciphertext block(s)
    pub fn finalize(self) -> Vec<u8> {
        let Self { cipher, pending } = self;
        cipher.encrypt_padded_vec_mut::<Pkcs7>(&pending)
    }
}

/// Decrypts a stream piece by piece
///
/// The final block is always held back until [`StreamDecryptor::finalize`]
/// because only it carries the padding.
pub struct StreamDecryptor {
    cipher: Aes256CbcDec,
    pending: Vec<u8>,
}

impl StreamDecryptor {
    /// Start a new stream under `key` and `iv`
    pub fn new(key: &SymmetricKey, iv: &Iv) -> Result<Self> {
        Ok(Self {
            cipher: symmetric::decryptor(key, iv)?,
            pending: Vec::with_capacity(2 * BLOCK_SIZE),
        })
    }

    /// Feed ciphertext, returning plaintext for every block that is safe to release
    pub fn update(&mut self, data: &[u8]) -> Vec<u8> {
        self.pending.extend_from_slice(data);
        let len = self.pending.len();
        if len <= BLOCK_SIZE {
            return Vec::new();
        }
        let keep = match len % BLOCK_SIZE {
            0 => BLOCK_SIZE,
            rem => rem,
        };
        let mut out: Vec<u8> = self.pending.drain(..len - keep).collect();
        for block in out.chunks_exact_mut(BLOCK_SIZE) {
            self.cipher.decrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        out
    }

    /// Check and strip the padding of the held-back block
    pub fn finalize(self) -> Result<Vec<u8>> {
        let Self { cipher, pending } = self;
        if pending.len() != BLOCK_SIZE {
            return Err(CryptoError::InvalidCiphertext(format!(
                "stream ended with {} trailing bytes, expected one full block",
                pending.len()
            )));
        }
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(&pending)
            .map_err(|_| CryptoError::Decryption("bad padding or wrong key".to_string()))
    }
}

/// Encrypt everything `reader` yields into `writer` as `IV ‖ ciphertext`.
///
/// A fresh IV is generated and written first. Returns the number of bytes
/// written. The writer is flushed but not shut down.
pub async fn encrypt_stream<R, W>(
    key: &SymmetricKey,
    reader: &mut R,
    writer: &mut W,
    chunk_size: usize,
) -> Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let iv = Iv::generate();
    let mut encryptor = StreamEncryptor::new(key, &iv)?;
    let mut buffer = vec![0u8; chunk_size.max(BLOCK_SIZE)];

    writer.write_all(iv.as_bytes()).await?;
    let mut written = IV_SIZE as u64;

    loop {
        let n = reader.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        let out = encryptor.update(&buffer[..n]);
        writer.write_all(&out).await?;
        written += out.len() as u64;
    }

    let tail = encryptor.finalize();
    writer.write_all(&tail).await?;
    writer.flush().await?;
    Ok(written + tail.len() as u64)
}

/// Decrypt an `IV ‖ ciphertext` stream from `reader` into `writer`.
///
/// Returns the number of plaintext bytes written. On a padding failure some
/// plaintext may already have reached `writer`; callers that need
/// all-or-nothing semantics must write to a staging location.
pub async fn decrypt_stream<R, W>(
    key: &SymmetricKey,
    reader: &mut R,
    writer: &mut W,
    chunk_size: usize,
) -> Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut iv = [0u8; IV_SIZE];
    reader.read_exact(&mut iv).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => {
            CryptoError::InvalidCiphertext("stream too short to hold an IV".to_string())
        }
        _ => CryptoError::Io(e),
    })?;

    let mut decryptor = StreamDecryptor::new(key, &Iv::from_bytes(&iv)?)?;
    let mut buffer = vec![0u8; chunk_size.max(BLOCK_SIZE)];
    let mut written = 0u64;

    loop {
        let n = reader.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        let out = decryptor.update(&buffer[..n]);
        writer.write_all(&out).await?;
        written += out.len() as u64;
    }

    let tail = decryptor.finalize()?;
    writer.write_all(&tail).await?;
    writer.flush().await?;
    Ok(written + tail.len() as u64)
}

//! Application constants

/// How long a short link stays resolvable (24 hours)
pub const SHORT_LINK_TTL_SECS: i64 = 24 * 60 * 60;

/// Length of generated short codes
pub const SHORT_CODE_LEN: usize = 6;

/// Alphabet for generated short codes. Omits 0/O, 1/l/I so codes survive being read aloud.
pub const SHORT_CODE_ALPHABET: &[u8] = b"23456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";

/// Fixed exchange rate: 1 USD in IDR
pub const USD_TO_IDR: f64 = 15_500.0;

/// Default port when PORT is unset
pub const DEFAULT_PORT: u16 = 3000;

/// Default interval between expired short-link sweeps (1 hour)
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60 * 60;

/// Default upper bound for the upstream transcript fetch
pub const DEFAULT_TRANSCRIPT_TIMEOUT_SECS: u64 = 30;

/// Default upper bound for a text-to-image request (inference can be slow on CPU)
pub const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 60;

/// Maximum upload size for media tools (200 MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Default inference endpoint for text-to-image
pub const DEFAULT_HF_MODEL_URL: &str =
    "https://api-inference.huggingface.co/models/runwayml/stable-diffusion-v1-5";

/// Side length of generated images and of the placeholder SVG
pub const GENERATED_IMAGE_SIZE: u32 = 384;

/// Prompt characters shown on the placeholder image
pub const PLACEHOLDER_PROMPT_CHARS: usize = 30;

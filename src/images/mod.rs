//! News image handling: codec work and blob-backed persistence.

pub mod codec;
pub mod repository;

pub use codec::{
    format_for_content_type, validate_image, ImageCodec, PreparedImage, DEFAULT_THUMBNAIL_SIZE,
    STORED_CONTENT_TYPE,
};
pub use repository::NewsImageRepository;

//! Rich-text resolution.
//!
//! Rich-text elements arrive as HTML with three kinds of placeholders:
//!
//! - linked-item embeds: `<object type="application/kenticocloud" data-type="item"
//!   data-rel="component|link" data-codename="..."></object>`
//! - inline images: `<img ... data-image-id="...">`
//! - hyperlinks to items: `<a data-item-id="..." href="">...</a>`
//!
//! [`RichTextResolver`] replaces them using the response's [`ItemGraph`](crate::models::ItemGraph),
//! the element's images and links, and the configured resolvers.

mod placeholder;
mod resolver;

pub(crate) use placeholder::embedded_codenames;
pub use resolver::{ResolvedRichText, RichTextInput, RichTextResolver};

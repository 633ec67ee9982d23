//! iCalendar feed handling: date token codec, decoder and single-event encoder.

pub mod decoder;
pub mod encoder;
pub mod models;
pub mod time;

pub use decoder::decode;
pub use encoder::{encode, export_file, ExportEvent, IcsExport};
pub use models::CalendarEvent;
pub use time::{decode_token, encode_token, DecodedToken};

//! # cansig
//!
//! Packs physical signal values into fixed-length CAN frame payloads and
//! unpacks them again.
//!
//! Each signal is described by a [signal::SignalDescriptor]: start bit, bit
//! length (1..=64), byte order (Intel or Motorola), signedness, storage kind
//! (integer or IEEE float), linear scale/offset and optional raw bounds. A
//! [message::MessageDescriptor] groups the signals of one frame. The codec
//! works on caller-owned byte buffers and holds no state between calls.
//!
//! ## Example
//!
//! ```
//! use cansig::message::MessageDescriptor;
//! use cansig::signal::SignalDescriptor;
//! use cansig::transform::RawValue;
//!
//! let message = MessageDescriptor::builder("ExampleMessage", 0x1f0, 8)
//!     .signal(SignalDescriptor::builder("enable", 7, 1).big_endian().build().unwrap())
//!     .signal(
//!         SignalDescriptor::builder("average_radius", 6, 6)
//!             .big_endian()
//!             .scale(0.1)
//!             .raw_range(RawValue::Unsigned(0), RawValue::Unsigned(50))
//!             .build()
//!             .unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut frame = [0u8; 8];
//! message.wrap_pack(&mut frame, &[1.0, 2.0]).unwrap();
//! assert_eq!(frame[0], 0xa8);
//!
//! let decoded = message.decode_frame(&frame).unwrap();
//! assert_eq!(decoded.values, vec![1.0, 2.0]);
//! ```

pub mod bits;
pub mod errors;
pub mod message;
pub mod range;
#[cfg(feature = "serde")]
pub mod serde;
pub mod signal;
pub mod transform;
pub mod wrap;

pub use bits::ByteOrder;
pub use errors::{CodecError, DescriptorError, status_code_of};
pub use message::{MessageDescriptor, RawFrame};
pub use signal::SignalDescriptor;
pub use transform::{RawValue, StorageKind};
pub use wrap::DecodedFrame;

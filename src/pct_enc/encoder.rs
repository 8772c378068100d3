//! Percent-encoders for URI components.
//!
//! An encoder names the allowed set of one grammar production. Component
//! encoders (such as [`Path`] and [`Query`]) validate whole components, while
//! data encoders (such as [`Segment`] and [`Param`]) are used to encode
//! arbitrary text into a single element of a component.

use super::{table::*, Encoder, Table};

macro_rules! encoders {
    ($($(#[$attr:meta])* $name:ident => $table:expr,)+) => {
        $(
            $(#[$attr])*
            #[derive(Clone, Copy, Debug)]
            pub struct $name(());

            impl Encoder for $name {
                const TABLE: Table = $table;
            }
        )+
    };
}

encoders! {
    /// An encoder for the userinfo subcomponent.
    Userinfo => USERINFO,
    /// An encoder for the registered name of the host subcomponent.
    RegName => REG_NAME,
    /// An encoder for the path component.
    Path => PATH,
    /// An encoder for a single path segment.
    ///
    /// Encodes `'/'` so that data never splits into two segments.
    Segment => SEGMENT,
    /// An encoder for the first segment of a relative-path reference.
    ///
    /// Encodes `':'` in addition to what [`Segment`] encodes, so that the
    /// segment is not mistaken for a scheme.
    SegmentNzNc => SEGMENT_NZ_NC,
    /// An encoder for the query component.
    Query => QUERY,
    /// An encoder for the key or value of a query element.
    ///
    /// Encodes `'&'`, `'='` and `'+'` so that data never changes the
    /// structure of the query.
    Param => QUERY_DATA,
    /// An encoder for the fragment component.
    Fragment => FRAGMENT,
}

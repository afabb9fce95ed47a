//! Message body rendering for the logger facade
//!
//! A message is one part or a group of parts. Each part is rendered on its
//! own and the results are joined with a single space.

use std::borrow::Cow;
use std::fmt::{self, Debug};

/// One value inside a log message.
pub trait MessagePart {
    fn render(&self) -> String;
}

/// Anything a [`Logger`](crate::Logger) emit operation accepts.
pub trait Message {
    fn into_message(self) -> String;
}

/// Renders the wrapped value with its structural (`Debug`) representation.
///
/// ```
/// use axe_logger::{Inspect, Message};
///
/// let msg = ("state:", Inspect(vec![1, 2])).into_message();
/// assert_eq!(msg, "state: [1, 2]");
/// ```
pub struct Inspect<T: Debug>(pub T);

impl<T: Debug> MessagePart for Inspect<T> {
    fn render(&self) -> String {
        format!("{:?}", self.0)
    }
}

impl<T: Debug> Message for Inspect<T> {
    fn into_message(self) -> String {
        self.render()
    }
}

macro_rules! display_parts {
    ($($ty:ty),* $(,)?) => {
        $(
            impl MessagePart for $ty {
                fn render(&self) -> String {
                    self.to_string()
                }
            }

            impl Message for $ty {
                fn into_message(self) -> String {
                    self.render()
                }
            }
        )*
    };
}

display_parts!(
    String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32,
    f64,
);

impl MessagePart for &str {
    fn render(&self) -> String {
        (*self).to_string()
    }
}

impl Message for &str {
    fn into_message(self) -> String {
        self.to_string()
    }
}

impl MessagePart for &String {
    fn render(&self) -> String {
        (*self).clone()
    }
}

impl Message for &String {
    fn into_message(self) -> String {
        self.clone()
    }
}

impl MessagePart for Cow<'_, str> {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl Message for Cow<'_, str> {
    fn into_message(self) -> String {
        self.into_owned()
    }
}

impl MessagePart for fmt::Arguments<'_> {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl Message for fmt::Arguments<'_> {
    fn into_message(self) -> String {
        self.to_string()
    }
}

/// A missing value renders as `null`.
impl<T: MessagePart> MessagePart for Option<T> {
    fn render(&self) -> String {
        match self {
            Some(value) => value.render(),
            None => "null".to_string(),
        }
    }
}

impl<T: MessagePart> Message for Option<T> {
    fn into_message(self) -> String {
        self.render()
    }
}

/// The unit value stands in for "no value given" and renders as `undefined`.
impl MessagePart for () {
    fn render(&self) -> String {
        "undefined".to_string()
    }
}

impl Message for () {
    fn into_message(self) -> String {
        String::new()
    }
}

impl MessagePart for serde_json::Value {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl Message for serde_json::Value {
    fn into_message(self) -> String {
        self.render()
    }
}

impl<T: MessagePart> Message for Vec<T> {
    fn into_message(self) -> String {
        join_parts(self.iter().map(MessagePart::render))
    }
}

impl<T: MessagePart> Message for &[T] {
    fn into_message(self) -> String {
        join_parts(self.iter().map(MessagePart::render))
    }
}

macro_rules! tuple_messages {
    ($( ($($name:ident),+) ),* $(,)?) => {
        $(
            impl<$($name: MessagePart),+> Message for ($($name,)+) {
                #[allow(non_snake_case)]
                fn into_message(self) -> String {
                    let ($($name,)+) = self;
                    join_parts([$($name.render()),+])
                }
            }
        )*
    };
}

tuple_messages!(
    (A),
    (A, B),
    (A, B, C),
    (A, B, C, D),
    (A, B, C, D, E),
    (A, B, C, D, E, F),
    (A, B, C, D, E, F, G),
    (A, B, C, D, E, F, G, H),
);

fn join_parts(parts: impl IntoIterator<Item = String>) -> String {
    parts.into_iter().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_values() {
        assert_eq!("hello".into_message(), "hello");
        assert_eq!(String::from("owned").into_message(), "owned");
        assert_eq!(42u32.into_message(), "42");
        assert_eq!(1.5f64.into_message(), "1.5");
        assert_eq!(true.into_message(), "true");
    }

    #[test]
    fn test_parts_joined_with_single_space() {
        assert_eq!(("disk at", 93, "%").into_message(), "disk at 93 %");
        assert_eq!(vec!["a", "b", "c"].into_message(), "a b c");
        let parts: &[i32] = &[1, 2, 3];
        assert_eq!(parts.into_message(), "1 2 3");
    }

    #[test]
    fn test_missing_values() {
        let missing: Option<&str> = None;
        assert_eq!(("value:", missing).into_message(), "value: null");
        assert_eq!(("value:", ()).into_message(), "value: undefined");
        assert_eq!(().into_message(), "");
    }

    #[test]
    fn test_structured_values() {
        let value = json!({"id": 7, "tags": ["a"]});
        assert_eq!(
            ("payload", value).into_message(),
            r#"payload {"id":7,"tags":["a"]}"#
        );

        #[derive(Debug)]
        struct Point {
            x: i32,
            y: i32,
        }
        assert_eq!(
            Inspect(Point { x: 1, y: 2 }).into_message(),
            "Point { x: 1, y: 2 }"
        );
    }

    #[test]
    fn test_format_arguments() {
        let msg = format_args!("{}-{}", 1, 2).into_message();
        assert_eq!(msg, "1-2");
    }
}

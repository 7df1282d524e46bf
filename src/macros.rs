/// Builds a [`Charge`](crate::Charge) from a literal-like syntax.
///
/// ```rust
/// use uri_charge::{charge, encode_charge};
///
/// let value = charge!({ "q": "rust", "tags": ["a", "b"], "draft": false });
/// assert_eq!(encode_charge(&value).unwrap(), "q(rust)tags(a,b)draft(-)");
/// ```
#[macro_export]
macro_rules! charge {
    (none) => {
        $crate::Charge::None
    };

    (null) => {
        $crate::Charge::Single($crate::UcValue::Null)
    };

    (true) => {
        $crate::Charge::Single($crate::UcValue::Bool(true))
    };

    (false) => {
        $crate::Charge::Single($crate::UcValue::Bool(false))
    };

    ([]) => {
        $crate::Charge::List(vec![])
    };

    ([ $($item:tt),* $(,)? ]) => {
        $crate::Charge::List(vec![$($crate::charge!($item)),*])
    };

    ({}) => {
        $crate::Charge::Map($crate::UcMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::UcMap::new();
        $(
            map.insert($key.to_string(), $crate::charge!($value));
        )*
        $crate::Charge::Map(map)
    }};

    ($other:expr) => {
        $crate::Charge::from($other)
    };
}

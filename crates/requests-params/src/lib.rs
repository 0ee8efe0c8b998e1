//! Nested parameter values and their bracket-notation URL encoding.
//!
//! Maps flatten to `key[sub]=value`, lists to `key[0]=value`:
//!
//! ```
//! use requests_params::{build_query, map, Order, Value};
//!
//! let params = map([("q", Value::from("rust")), ("tags", Value::from(vec!["a", "b"]))]);
//! assert_eq!(build_query(&params, Order::Insertion), "q=rust&tags%5B0%5D=a&tags%5B1%5D=b");
//! ```

pub mod encode;
pub mod value;

pub use encode::{build_query, encode, escape, make_key, Order};
pub use value::{map, merge, Map, Value};

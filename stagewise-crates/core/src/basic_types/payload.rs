use std::fmt::Debug;

use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

// States and solutions carry their domain data as `Rc<dyn Payload>`; the domain hooks downcast it
// back to the concrete type they produced.
impl_downcast!(Payload);

/// The domain-specific data carried by a state or a solution (e.g. a robot configuration or a
/// trajectory).
///
/// The engine never inspects a payload; every `'static` type implementing [`Debug`] can be used.
pub trait Payload: Downcast + Debug {}

impl<T: Debug + 'static> Payload for T {}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::Payload;

    #[test]
    fn payload_can_be_downcast() {
        let payload: Rc<dyn Payload> = Rc::new(42_i64);

        assert_eq!(Some(&42), payload.downcast_ref::<i64>());
        assert!(payload.downcast_ref::<String>().is_none());
    }
}

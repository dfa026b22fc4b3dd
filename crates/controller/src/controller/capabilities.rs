use bitflags::bitflags;

#[rustfmt::skip]
bitflags! {
  pub struct ControllerCapabilities: u32 {
    const CREATE_DELETE_VOLUME         = 0b_0000_0000_0000_0001;
    const PUBLISH_UNPUBLISH_VOLUME     = 0b_0000_0000_0000_0010;
    const LIST_VOLUMES                 = 0b_0000_0000_0000_0100;
    const GET_CAPACITY                 = 0b_0000_0000_0000_1000;
  }
}

const RPC_TYPES: &[(ControllerCapabilities, &str)] = &[
  (
    ControllerCapabilities::CREATE_DELETE_VOLUME,
    "CREATE_DELETE_VOLUME",
  ),
  (
    ControllerCapabilities::PUBLISH_UNPUBLISH_VOLUME,
    "PUBLISH_UNPUBLISH_VOLUME",
  ),
  (ControllerCapabilities::LIST_VOLUMES, "LIST_VOLUMES"),
  (ControllerCapabilities::GET_CAPACITY, "GET_CAPACITY"),
];

impl ControllerCapabilities {
  /// The CSI `ControllerServiceCapability.RPC.Type` names of the set
  /// capabilities, in wire order.
  pub fn rpc_types(self) -> Vec<&'static str> {
    RPC_TYPES
      .iter()
      .filter(|(cap, _)| self.contains(*cap))
      .map(|(_, name)| *name)
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rpc_types_follow_flags() {
    assert!(ControllerCapabilities::empty().rpc_types().is_empty());
    assert_eq!(
      (ControllerCapabilities::LIST_VOLUMES | ControllerCapabilities::CREATE_DELETE_VOLUME).rpc_types(),
      vec!["CREATE_DELETE_VOLUME", "LIST_VOLUMES"]
    );
    assert_eq!(ControllerCapabilities::all().rpc_types().len(), RPC_TYPES.len());
  }
}

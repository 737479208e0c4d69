use bitflags::bitflags;

bitflags! {
    /// Per-request search options.
    #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PathFlags: u8 {
        /// If the path is longer than the waypoint buffer, keep the first
        /// `capacity` steps and mark the buffer partial instead of failing.
        const ALLOW_PARTIAL = 1 << 0;
        /// Search the four cardinal directions only.
        const CARDINAL_ONLY = 1 << 1;
    }
}

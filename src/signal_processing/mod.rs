pub mod butterworth;
pub mod channel;
pub mod speaker;

pub use butterworth::ButterworthCoefficients;
pub use channel::ChannelFilterState;
pub use speaker::SpeakerFilter;

use biometrics::{Collector, Counter};

pub(crate) static PROVIDER_REQUESTS: Counter = Counter::new("colloquy.provider.requests");
pub(crate) static PROVIDER_REQUEST_ERRORS: Counter =
    Counter::new("colloquy.provider.request_errors");
pub(crate) static PROVIDER_DROPPED_IMAGE_BLOCKS: Counter =
    Counter::new("colloquy.provider.dropped_image_blocks");

pub(crate) static STREAM_FRAGMENTS: Counter = Counter::new("colloquy.stream.fragments");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("colloquy.stream.errors");

pub(crate) static SESSION_TURNS: Counter = Counter::new("colloquy.session.turns");
pub(crate) static SESSION_RESETS: Counter = Counter::new("colloquy.session.resets");
pub(crate) static SESSION_SUPPRESSED: Counter = Counter::new("colloquy.session.suppressed");

pub(crate) static IMAGE_REQUESTS: Counter = Counter::new("colloquy.image.requests");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&PROVIDER_REQUESTS);
    collector.register_counter(&PROVIDER_REQUEST_ERRORS);
    collector.register_counter(&PROVIDER_DROPPED_IMAGE_BLOCKS);

    collector.register_counter(&STREAM_FRAGMENTS);
    collector.register_counter(&STREAM_ERRORS);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_RESETS);
    collector.register_counter(&SESSION_SUPPRESSED);

    collector.register_counter(&IMAGE_REQUESTS);
}

use disco_common::time::TimestampMillis;

// Millis per second, it is used to prevent having random 1000 values anywhere
pub const MILLIS_PER_SECOND: u64 = 1000;

// Tickets
// Minimum time a requester waits before redeeming a ticket
pub const DEFAULT_TICKET_BASE_WAIT_MILLIS: u64 = MILLIS_PER_SECOND;
// Each outstanding ticket on a topic delays the next one by this much
pub const DEFAULT_TICKET_SPACING_MILLIS: u64 = 250;
// A ticket is honored for 10 minutes once its wait time is over
pub const DEFAULT_TICKET_LIFETIME_MILLIS: TimestampMillis = 10 * 60 * MILLIS_PER_SECOND;
// Size of the ticket authentication secret
pub const TICKET_SECRET_SIZE: usize = 32;

// Topic registry
// Maximum advertisements stored per topic
pub const DEFAULT_TOPIC_CAPACITY: usize = 100;
// Advertisements live 15 minutes, longer than a ticket is honored
pub const DEFAULT_AD_LIFETIME_MILLIS: TimestampMillis = 15 * 60 * MILLIS_PER_SECOND;
// Maximum topics tracked at once, by the registry and by the wait time policy
pub const DEFAULT_MAX_TOPICS: usize = 1000;

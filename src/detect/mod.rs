// Payload sniffing — tells decodable images apart from error pages and junk.

pub mod format;

pub mod playlist;
pub mod radio;
pub mod track;

pub use playlist::{Playlist, PlaylistMeta};
pub use radio::{GreetingRequest, GreetingResponse, RadioRequest, RadioResponse};
pub use track::{Track, TrackInfo};

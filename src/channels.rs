//! Channel registry
//!
//! Fixed, ordered list of stations. Navigation wraps in both directions.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A radio station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Name read out when the channel is selected
    pub name: String,
    /// Stream URL handed to the player
    pub url: String,
}

impl Channel {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Stations shipped with the appliance
pub fn default_channels() -> Vec<Channel> {
    vec![
        Channel::new("Radio P.R.O.S.", "http://audiostreamen.nl:8012"),
        Channel::new(
            "Star Radio",
            "http://internetradio.radiostar.be:8000/;stream.nsv&type=mp3",
        ),
        Channel::new("Radio 1", "http://icecast.vrtcdn.be/radio1-high.mp3"),
        Channel::new(
            "Radio 2 oost-vlaanderen",
            "http://icecast.vrtcdn.be/ra2ovl-high.mp3",
        ),
        Channel::new("MNM", "http://icecast.vrtcdn.be/mnm-high.mp3"),
        Channel::new("Studio Brussel", "http://icecast.vrtcdn.be/stubru-high.mp3"),
        Channel::new(
            "Joe FM",
            "http://icecast-qmusic.cdp.triple-it.nl/JOEfm_be_live_128.mp3",
        ),
        Channel::new(
            "Nostalgie",
            "http://nostalgiewhatafeeling.ice.infomaniak.ch/nostalgiewhatafeeling-128.mp3",
        ),
        Channel::new(
            "Q music",
            "http://icecast-qmusic.cdp.triple-it.nl/Qmusic_be_live_128.mp3",
        ),
    ]
}

/// Immutable, non-empty channel list
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    channels: Vec<Channel>,
}

// Never empty, so no `is_empty`
#[allow(clippy::len_without_is_empty)]
impl ChannelRegistry {
    /// Create a registry; an empty list is rejected
    pub fn new(channels: Vec<Channel>) -> Result<Self, ConfigError> {
        if channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        Ok(Self { channels })
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn get(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.channels.len()
    }

    /// Index reached by moving `delta` positions from `index`, wrapping
    pub fn offset(&self, index: usize, delta: i32) -> usize {
        let len = self.channels.len() as i64;
        (index as i64 + delta as i64).rem_euclid(len) as usize
    }

    /// Index after `index`, wrapping to the first channel
    pub fn next_index(&self, index: usize) -> usize {
        self.offset(index, 1)
    }

    /// Index before `index`, wrapping to the last channel
    pub fn previous_index(&self, index: usize) -> usize {
        self.offset(index, -1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self {
            channels: default_channels(),
        }
    }
}

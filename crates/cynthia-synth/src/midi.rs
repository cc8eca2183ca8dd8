//! MIDI event decoding and dispatch to the voice pool.
//!
//! Events are raw three-byte messages. Only the command nibble of the status
//! byte is read; the channel nibble is ignored, so the instrument answers on
//! every channel. Data bytes are masked to 7 bits before use.
//!
//! | Status (high nibble) | Data | Result |
//! |----------------------|------|--------|
//! | `0x8_` | note, velocity | note-off |
//! | `0x9_` | note, velocity > 0 | note-on |
//! | `0x9_` | note, velocity = 0 | note-off (running status convention) |
//! | anything else | - | ignored |

use cynthia_core::Filter;

use crate::control::VoiceParams;
use crate::pool::VoicePool;

/// Note-off command nibble.
pub const NOTE_OFF: u8 = 0x80;
/// Note-on command nibble.
pub const NOTE_ON: u8 = 0x90;

/// A raw MIDI message stamped with its position inside the block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEvent {
    /// Status byte (command in the high nibble, channel in the low nibble).
    pub status: u8,
    /// First data byte.
    pub data1: u8,
    /// Second data byte.
    pub data2: u8,
    /// Frame offset from the start of the block.
    pub offset: usize,
}

impl MidiEvent {
    /// Raw event.
    pub fn new(status: u8, data1: u8, data2: u8, offset: usize) -> Self {
        Self {
            status,
            data1,
            data2,
            offset,
        }
    }

    /// Note-on on channel 1.
    pub fn note_on(note: u8, velocity: u8, offset: usize) -> Self {
        Self::new(NOTE_ON, note, velocity, offset)
    }

    /// Note-off on channel 1.
    pub fn note_off(note: u8, offset: usize) -> Self {
        Self::new(NOTE_OFF, note, 0, offset)
    }

    /// Decoded form of this event.
    pub fn message(&self) -> MidiMessage {
        MidiMessage::decode(self.status, self.data1, self.data2)
    }
}

/// A decoded MIDI message, as far as the engine cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiMessage {
    /// Start a note.
    NoteOn {
        /// Note number (0-127).
        note: u8,
        /// Velocity (1-127).
        velocity: u8,
    },
    /// Release a note.
    NoteOff {
        /// Note number (0-127).
        note: u8,
    },
    /// Any other command.
    Ignored,
}

impl MidiMessage {
    /// Decode a raw three-byte message.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cynthia_synth::MidiMessage;
    ///
    /// // Note-on with velocity 0 on channel 3 is a note-off.
    /// assert_eq!(MidiMessage::decode(0x92, 60, 0), MidiMessage::NoteOff { note: 60 });
    /// // Data bytes are masked to 7 bits.
    /// assert_eq!(
    ///     MidiMessage::decode(0x90, 0xBC, 0xE4),
    ///     MidiMessage::NoteOn { note: 60, velocity: 100 },
    /// );
    /// ```
    pub fn decode(status: u8, data1: u8, data2: u8) -> Self {
        let note = data1 & 0x7F;
        let velocity = data2 & 0x7F;
        match status & 0xF0 {
            NOTE_OFF => MidiMessage::NoteOff { note },
            NOTE_ON if velocity > 0 => MidiMessage::NoteOn { note, velocity },
            NOTE_ON => MidiMessage::NoteOff { note },
            _ => MidiMessage::Ignored,
        }
    }
}

/// Decode a raw message and apply it to `pool`.
///
/// Returns the decoded message so callers can observe what happened.
pub fn dispatch<const N: usize, F: Filter + Default>(
    pool: &mut VoicePool<N, F>,
    status: u8,
    data1: u8,
    data2: u8,
    params: &VoiceParams,
) -> MidiMessage {
    let message = MidiMessage::decode(status, data1, data2);
    match message {
        MidiMessage::NoteOn { note, velocity } => {
            pool.note_on(note, velocity, params);
        }
        MidiMessage::NoteOff { note } => pool.note_off(note),
        MidiMessage::Ignored => {}
    }
    message
}

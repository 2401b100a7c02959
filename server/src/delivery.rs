//! Addressing for outgoing packets
//!
//! Session and registry operations never touch the network. They append
//! `Outbound` messages to an `Outbox`, which the network layer drains in order.

use shared::{Packet, ParticipantId, SessionId};

#[derive(Debug, Clone, PartialEq)]
pub enum Recipient {
    /// Every participant on the session's roster at the time of emission
    Room {
        session_id: SessionId,
        members: Vec<ParticipantId>,
    },
    /// A single participant only
    Participant(ParticipantId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub recipient: Recipient,
    pub packet: Packet,
}

impl Outbound {
    /// Connection ids this message must reach
    pub fn client_ids(&self) -> Vec<ParticipantId> {
        match &self.recipient {
            Recipient::Room { members, .. } => members.clone(),
            Recipient::Participant(id) => vec![*id],
        }
    }
}

#[derive(Debug, Default)]
pub struct Outbox {
    messages: Vec<Outbound>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_participant(&mut self, id: ParticipantId, packet: Packet) {
        self.messages.push(Outbound {
            recipient: Recipient::Participant(id),
            packet,
        });
    }

    pub fn to_room(&mut self, session_id: &str, members: Vec<ParticipantId>, packet: Packet) {
        self.messages.push(Outbound {
            recipient: Recipient::Room {
                session_id: session_id.to_string(),
                members,
            },
            packet,
        });
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Outbound> {
        self.messages.drain(..)
    }

    pub fn messages(&self) -> &[Outbound] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Packets that reach `id`, in emission order
    pub fn received_by(&self, id: ParticipantId) -> Vec<&Packet> {
        self.messages
            .iter()
            .filter(|m| m.client_ids().contains(&id))
            .map(|m| &m.packet)
            .collect()
    }
}

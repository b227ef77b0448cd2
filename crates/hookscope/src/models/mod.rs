pub mod change;
pub mod common;
pub mod envelope;
pub mod messaging;
pub mod nlp;
pub mod whatsapp;

pub use change::{Change, ChangeValue, UnknownChange};
pub use common::{HasSender, Participant, Reference, SenderFields};
pub use envelope::{Entry, EntryPayload, EventEnvelope};
pub use messaging::{MessagingItem, MessagingPayload};
pub use nlp::{EntityKind, EntityKindTag, EntityRequirements, NlpEntities, NlpEntity, SpecificEntity};
pub use whatsapp::{WhatsappContent, WhatsappMessage, WhatsappMessagesValue};

//! Page change values (`feed`, `ratings`, `mention`, `conversations`, `leadgen`,
//! `permissions`) and the closed [`ChangeValue`] set they belong to.

use serde::Deserialize;
use serde_json::Value;

use crate::decode::coerce;
use crate::decode::key::ChangeKey;
use crate::models::common::{HasSender, Reference, SenderFields};
use crate::models::whatsapp::{
    WhatsappAccountReview, WhatsappAccountUpdate, WhatsappMessagesValue, WhatsappPhoneNumberName,
    WhatsappPhoneNumberQuality, WhatsappTemplateStatus,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub field: String,
    pub value: ChangeValue,
}

/// Exactly one decoded shape per change. `Unknown` is the fallback for keys no
/// registry entry matches.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeValue {
    FeedPost(FeedPost),
    FeedStatus(FeedStatus),
    FeedComment(FeedComment),
    FeedReaction(FeedReaction),
    FeedLike(FeedLike),
    FeedShare(FeedShare),
    FeedEvent(FeedEvent),
    FeedPhotoAdd(FeedPhotoAdd),
    FeedPhotoRemove(FeedPhotoRemove),
    FeedVideo(FeedVideo),
    FeedVideoRemove(FeedVideoRemove),
    FeedAlbumAdd(FeedAlbumAdd),
    FeedAlbumEdited(FeedAlbumEdited),
    RatingsRating(RatingsRating),
    RatingsComment(RatingsComment),
    RatingsLike(RatingsLike),
    RatingsReaction(RatingsReaction),
    Mention(Mention),
    PageConversation(PageConversation),
    Leadgen(Leadgen),
    Permission(Permission),
    WhatsappMessages(WhatsappMessagesValue),
    WhatsappAccountUpdate(WhatsappAccountUpdate),
    WhatsappAccountReview(WhatsappAccountReview),
    WhatsappPhoneNumberName(WhatsappPhoneNumberName),
    WhatsappPhoneNumberQuality(WhatsappPhoneNumberQuality),
    WhatsappTemplateStatus(WhatsappTemplateStatus),
    Unknown(UnknownChange),
}

impl ChangeValue {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FeedPost(_) => "feed_post",
            Self::FeedStatus(_) => "feed_status",
            Self::FeedComment(_) => "feed_comment",
            Self::FeedReaction(_) => "feed_reaction",
            Self::FeedLike(_) => "feed_like",
            Self::FeedShare(_) => "feed_share",
            Self::FeedEvent(_) => "feed_event",
            Self::FeedPhotoAdd(_) => "feed_photo_add",
            Self::FeedPhotoRemove(_) => "feed_photo_remove",
            Self::FeedVideo(_) => "feed_video",
            Self::FeedVideoRemove(_) => "feed_video_remove",
            Self::FeedAlbumAdd(_) => "feed_album_add",
            Self::FeedAlbumEdited(_) => "feed_album_edited",
            Self::RatingsRating(_) => "ratings_rating",
            Self::RatingsComment(_) => "ratings_comment",
            Self::RatingsLike(_) => "ratings_like",
            Self::RatingsReaction(_) => "ratings_reaction",
            Self::Mention(_) => "mention",
            Self::PageConversation(_) => "page_conversation",
            Self::Leadgen(_) => "leadgen",
            Self::Permission(_) => "permission",
            Self::WhatsappMessages(_) => "whatsapp_messages",
            Self::WhatsappAccountUpdate(_) => "whatsapp_account_update",
            Self::WhatsappAccountReview(_) => "whatsapp_account_review",
            Self::WhatsappPhoneNumberName(_) => "whatsapp_phone_number_name",
            Self::WhatsappPhoneNumberQuality(_) => "whatsapp_phone_number_quality",
            Self::WhatsappTemplateStatus(_) => "whatsapp_template_status",
            Self::Unknown(_) => "unknown",
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    #[must_use]
    pub fn as_unknown(&self) -> Option<&UnknownChange> {
        match self {
            Self::Unknown(unknown) => Some(unknown),
            _ => None,
        }
    }

    /// Sender shared-field view for the variants that carry one.
    #[must_use]
    pub fn sender_fields(&self) -> Option<&SenderFields> {
        let fields = match self {
            Self::FeedPost(value) => value.sender_fields(),
            Self::FeedStatus(value) => value.sender_fields(),
            Self::FeedComment(value) => value.sender_fields(),
            Self::FeedReaction(value) => value.sender_fields(),
            Self::FeedLike(value) => value.sender_fields(),
            Self::FeedShare(value) => value.sender_fields(),
            Self::FeedEvent(value) => value.sender_fields(),
            Self::FeedPhotoAdd(value) => value.sender_fields(),
            Self::FeedPhotoRemove(value) => value.sender_fields(),
            Self::FeedVideo(value) => value.sender_fields(),
            Self::FeedVideoRemove(value) => value.sender_fields(),
            Self::FeedAlbumAdd(value) => value.sender_fields(),
            Self::FeedAlbumEdited(value) => value.sender_fields(),
            Self::RatingsRating(value) => value.sender_fields(),
            Self::RatingsComment(value) => value.sender_fields(),
            Self::RatingsLike(value) => value.sender_fields(),
            Self::RatingsReaction(value) => value.sender_fields(),
            Self::Mention(value) => value.sender_fields(),
            _ => return None,
        };
        Some(fields)
    }

    #[must_use]
    pub fn sender(&self) -> Option<Reference> {
        self.sender_fields().and_then(SenderFields::resolve)
    }

    /// Free text carried by the change, when the variant has any.
    #[must_use]
    pub fn message_text(&self) -> Option<&str> {
        match self {
            Self::FeedPost(value) => value.message.as_deref(),
            Self::FeedStatus(value) => value.message.as_deref(),
            Self::FeedComment(value) => value.message.as_deref(),
            Self::FeedShare(value) => value.message.as_deref(),
            Self::FeedEvent(value) => value.message.as_deref(),
            Self::FeedPhotoAdd(value) => value.message.as_deref(),
            Self::FeedVideo(value) => value.message.as_deref(),
            Self::FeedAlbumAdd(value) => value.message.as_deref(),
            Self::RatingsRating(value) => value.review_text.as_deref(),
            Self::RatingsComment(value) => value.message.as_deref(),
            Self::Mention(value) => value.message.as_deref(),
            _ => None,
        }
    }
}

/// A change whose key has no registered decoder. The raw value is kept untouched
/// so it can be inspected or decoded again once a decoder exists.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownChange {
    key: ChangeKey,
    raw: Value,
}

impl UnknownChange {
    #[must_use]
    pub fn new(key: ChangeKey, raw: Value) -> Self {
        Self { key, raw }
    }

    #[must_use]
    pub fn key(&self) -> &ChangeKey {
        &self.key
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.key.field
    }

    #[must_use]
    pub fn item(&self) -> Option<&str> {
        self.key.item.as_deref()
    }

    #[must_use]
    pub fn verb(&self) -> Option<&str> {
        self.key.verb.as_deref()
    }

    #[must_use]
    pub fn raw_json(&self) -> &Value {
        &self.raw
    }

    #[must_use]
    pub fn into_raw(self) -> Value {
        self.raw
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeedPost {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub post_id: Option<String>,
    #[serde(default)]
    pub status_type: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub is_hidden: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub photos: Vec<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub recipient_id: Option<String>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeedStatus {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub post_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub is_hidden: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub photos: Vec<String>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

/// The post a comment belongs to, as embedded by newer API versions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CommentedPost {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub status_type: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub updated_time: Option<String>,
    #[serde(default)]
    pub permalink_url: Option<String>,
    #[serde(default)]
    pub promotion_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeedComment {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub post_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub comment_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub is_hidden: Option<bool>,
    #[serde(default)]
    pub post: Option<CommentedPost>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

impl FeedComment {
    /// A comment whose parent is another comment rather than the post itself.
    #[must_use]
    pub fn is_reply(&self) -> bool {
        match (&self.parent_id, &self.post_id) {
            (Some(parent), Some(post)) => parent != post,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeedReaction {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub post_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub comment_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub reaction_type: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeedLike {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub post_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub comment_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeedShare {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub post_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub share_id: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeedEvent {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub post_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub event_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeedPhotoAdd {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub post_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub photo_id: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeedPhotoRemove {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub post_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub photo_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub recipient_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeedVideo {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub post_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub video_id: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeedVideoRemove {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub video_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub recipient_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeedAlbumAdd {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub album_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub post_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeedAlbumEdited {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub album_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub post_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RatingsRating {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub open_graph_story_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub rating: Option<i64>,
    #[serde(default)]
    pub recommendation_type: Option<String>,
    #[serde(default)]
    pub review_text: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub reviewer_id: Option<String>,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RatingsComment {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub open_graph_story_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub comment_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub reviewer_id: Option<String>,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RatingsLike {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub open_graph_story_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub reviewer_id: Option<String>,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RatingsReaction {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub open_graph_story_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub comment_id: Option<String>,
    #[serde(default)]
    pub reaction_type: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub reviewer_id: Option<String>,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

/// The page was mentioned in a post or comment.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Mention {
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub post_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub comment_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PageConversation {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub page_id: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Leadgen {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub leadgen_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub page_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub form_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub ad_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub adgroup_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub created_time: Option<i64>,
}

/// A permission granted to or revoked from the app.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Permission {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub target_ids: Vec<String>,
}

impl Permission {
    #[must_use]
    pub fn is_granted(&self) -> bool {
        self.verb.as_deref() == Some("granted")
    }
}

macro_rules! impl_has_sender {
    ($($record:ty),+ $(,)?) => {
        $(
            impl HasSender for $record {
                fn sender_fields(&self) -> &SenderFields {
                    &self.sender
                }
            }
        )+
    };
}

impl_has_sender!(
    FeedPost,
    FeedStatus,
    FeedComment,
    FeedReaction,
    FeedLike,
    FeedShare,
    FeedEvent,
    FeedPhotoAdd,
    FeedPhotoRemove,
    FeedVideo,
    FeedVideoRemove,
    FeedAlbumAdd,
    FeedAlbumEdited,
    RatingsRating,
    RatingsComment,
    RatingsLike,
    RatingsReaction,
    Mention,
);

macro_rules! impl_reviewer {
    ($($record:ty),+ $(,)?) => {
        $(
            impl $record {
                /// The person who left the review, from the flat `reviewer_*` pair.
                #[must_use]
                pub fn reviewer(&self) -> Option<Reference> {
                    Reference::from_flat(self.reviewer_id.as_deref(), self.reviewer_name.as_deref())
                }
            }
        )+
    };
}

impl_reviewer!(RatingsRating, RatingsComment, RatingsLike, RatingsReaction);

//! Serenity event handler: turns gateway events into [`ChatService`] calls.

use std::sync::Arc;

use serenity::all::{
    ActivityData, Context, CreateAttachment, CreateEmbed, CreateEmbedFooter, CreateMessage,
    EditMessage, EventHandler, Message, Ready, Timestamp,
};
use serenity::async_trait;
use tracing::{Instrument, info, info_span, warn};

use crate::error::{BotError, BotResult};
use crate::reply::{ACTIVITY, EmbedSpec, Reply};
use crate::service::{ChatService, Plan};
use crate::source::AttachmentRef;

/// Gateway event handler backed by a shared [`ChatService`].
pub struct Handler {
    service: Arc<ChatService>,
}

impl Handler {
    /// Wrap a chat service.
    #[must_use]
    pub const fn new(service: Arc<ChatService>) -> Self {
        Self { service }
    }

    async fn respond(&self, ctx: &Context, msg: &Message, plan: Plan) -> BotResult<()> {
        match plan {
            Plan::Reply(reply) => {
                msg.channel_id
                    .send_message(ctx, create_message(reply).reference_message(msg))
                    .await
                    .map_err(|source| BotError::discord("message.reply", source))?;
            }
            Plan::Obfuscate(job) => {
                let mut progress = msg
                    .reply(ctx, job.processing_message())
                    .await
                    .map_err(|source| BotError::discord("message.reply", source))?;
                let reply = self.service.execute(job).await;
                progress
                    .edit(ctx, edit_message(reply))
                    .await
                    .map_err(|source| BotError::discord("message.edit", source))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "bot connected");
        ctx.set_activity(Some(ActivityData::watching(ACTIVITY)));
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let attachment = msg.attachments.first().map(|attachment| AttachmentRef {
            name: attachment.filename.clone(),
            size: u64::from(attachment.size),
            url: attachment.url.clone(),
        });
        let Some(plan) = self.service.plan(&msg.content, attachment) else {
            return;
        };

        let span = info_span!(
            "chat.command",
            channel_id = %msg.channel_id,
            author_id = %msg.author.id,
            kind = plan_kind(&plan)
        );
        if let Err(err) = self.respond(&ctx, &msg, plan).instrument(span).await {
            warn!(error = %err, source = ?std::error::Error::source(&err), "chat reply failed");
        }
    }
}

const fn plan_kind(plan: &Plan) -> &'static str {
    match plan {
        Plan::Reply(_) => "reply",
        Plan::Obfuscate(_) => "obfuscate",
    }
}

fn create_message(reply: Reply) -> CreateMessage {
    let mut builder = CreateMessage::new();
    if let Some(content) = reply.content {
        builder = builder.content(content);
    }
    if let Some(embed) = reply.embed {
        builder = builder.embed(build_embed(embed));
    }
    if let Some(file) = reply.file {
        builder = builder.add_file(CreateAttachment::bytes(file.contents, file.name));
    }
    builder
}

fn edit_message(reply: Reply) -> EditMessage {
    let mut builder = EditMessage::new().content(reply.content.unwrap_or_default());
    if let Some(embed) = reply.embed {
        builder = builder.embed(build_embed(embed));
    }
    if let Some(file) = reply.file {
        builder = builder.new_attachment(CreateAttachment::bytes(file.contents, file.name));
    }
    builder
}

fn build_embed(embed: EmbedSpec) -> CreateEmbed {
    let mut builder = CreateEmbed::new().title(embed.title).color(embed.colour);
    if let Some(description) = embed.description {
        builder = builder.description(description);
    }
    for field in embed.fields {
        builder = builder.field(field.name, field.value, field.inline);
    }
    if let Some(footer) = embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer));
    }
    if embed.timestamp {
        builder = builder.timestamp(Timestamp::now());
    }
    builder
}

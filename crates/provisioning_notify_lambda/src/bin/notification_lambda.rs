use std::collections::HashMap;

use aws_config::{BehaviorVersion, Region};
use aws_lambda_events::event::sqs::SqsEvent;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sns::types::MessageAttributeValue;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use provisioning_notify_core::contract::ACTION_ATTRIBUTE;
use provisioning_notify_core::notification::Notification;
use provisioning_notify_core::settings::NotificationChannel;
use provisioning_notify_lambda::adapters::notification_sink::NotificationSink;
use provisioning_notify_lambda::adapters::parameter_store::ParameterStore;
use provisioning_notify_lambda::config::{NotificationHandlerConfig, RuntimeConfig, SinkTarget};
use provisioning_notify_lambda::handlers::notification::{handle_sqs_event, BatchSummary};
use provisioning_notify_lambda::telemetry::{init_tracing, LogFormat};

const EMAIL_CHARSET: &str = "UTF-8";
const RECIPIENT_ATTRIBUTE: &str = "recipient";

struct SsmParameterStore {
    ssm_client: aws_sdk_ssm::Client,
}

impl ParameterStore for SsmParameterStore {
    fn get_parameter(&self, name: &str) -> Result<String, String> {
        let client = self.ssm_client.clone();
        let parameter_name = name.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_parameter()
                    .name(&parameter_name)
                    .send()
                    .await
                    .map_err(|error| {
                        format!(
                            "failed to read parameter {parameter_name}: {}",
                            aws_sdk_ssm::error::DisplayErrorContext(&error)
                        )
                    })?;

                output
                    .parameter()
                    .and_then(|parameter| parameter.value())
                    .map(str::to_string)
                    .ok_or_else(|| format!("parameter {parameter_name} has no value"))
            })
        })
    }
}

struct SesEmailSink {
    sender_email: String,
    ses_client: aws_sdk_sesv2::Client,
}

impl NotificationSink for SesEmailSink {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    fn deliver(&self, notification: &Notification) -> Result<Option<String>, String> {
        let content = email_content(notification)?;
        let destination = Destination::builder()
            .to_addresses(notification.recipient.clone())
            .build();
        let sender = self.sender_email.clone();
        let client = self.ses_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .send_email()
                    .from_email_address(sender)
                    .destination(destination)
                    .content(content)
                    .send()
                    .await
                    .map(|output| output.message_id().map(str::to_string))
                    .map_err(|error| {
                        format!(
                            "failed to send email: {}",
                            aws_sdk_sesv2::error::DisplayErrorContext(&error)
                        )
                    })
            })
        })
    }
}

struct SnsTopicSink {
    topic_arn: String,
    sns_client: aws_sdk_sns::Client,
}

impl NotificationSink for SnsTopicSink {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Sns
    }

    fn deliver(&self, notification: &Notification) -> Result<Option<String>, String> {
        let attributes = publish_attributes(notification)?;
        let topic_arn = self.topic_arn.clone();
        let subject = notification.subject().to_string();
        let message = notification.body_text().to_string();
        let client = self.sns_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .publish()
                    .topic_arn(topic_arn)
                    .subject(subject)
                    .message(message)
                    .set_message_attributes(Some(attributes))
                    .send()
                    .await
                    .map(|output| output.message_id().map(str::to_string))
                    .map_err(|error| {
                        format!(
                            "failed to publish notification: {}",
                            aws_sdk_sns::error::DisplayErrorContext(&error)
                        )
                    })
            })
        })
    }
}

fn email_content(notification: &Notification) -> Result<EmailContent, String> {
    let body = Body::builder()
        .html(utf8_content(&notification.request.html_body())?)
        .text(utf8_content(notification.body_text())?)
        .build();
    let message = Message::builder()
        .subject(utf8_content(notification.subject())?)
        .body(body)
        .build();
    Ok(EmailContent::builder().simple(message).build())
}

fn utf8_content(data: &str) -> Result<Content, String> {
    Content::builder()
        .data(data)
        .charset(EMAIL_CHARSET)
        .build()
        .map_err(|error| format!("invalid email content: {error}"))
}

fn publish_attributes(
    notification: &Notification,
) -> Result<HashMap<String, MessageAttributeValue>, String> {
    let mut attributes = HashMap::new();
    for (name, value) in [
        (ACTION_ATTRIBUTE, notification.action.as_str()),
        (RECIPIENT_ATTRIBUTE, notification.recipient.as_str()),
    ] {
        let attribute = MessageAttributeValue::builder()
            .data_type("String")
            .string_value(value)
            .build()
            .map_err(|error| format!("invalid message attribute {name}: {error}"))?;
        attributes.insert(name.to_string(), attribute);
    }
    Ok(attributes)
}

struct RuntimeDependencies {
    handler_config: NotificationHandlerConfig,
    parameter_store: SsmParameterStore,
    sink: Box<dyn NotificationSink + Send + Sync>,
}

impl RuntimeDependencies {
    async fn load(config: RuntimeConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = config.region {
            loader = loader.region(Region::new(region));
        }
        let aws_config = loader.load().await;

        let sink: Box<dyn NotificationSink + Send + Sync> = match config.sink {
            SinkTarget::Email { sender_email } => Box::new(SesEmailSink {
                sender_email,
                ses_client: aws_sdk_sesv2::Client::new(&aws_config),
            }),
            SinkTarget::Topic { topic_arn } => Box::new(SnsTopicSink {
                topic_arn,
                sns_client: aws_sdk_sns::Client::new(&aws_config),
            }),
        };

        Self {
            handler_config: config.handler,
            parameter_store: SsmParameterStore {
                ssm_client: aws_sdk_ssm::Client::new(&aws_config),
            },
            sink,
        }
    }
}

async fn handle_request(
    event: LambdaEvent<SqsEvent>,
    deps: &RuntimeDependencies,
) -> Result<BatchSummary, Error> {
    handle_sqs_event(
        event.payload,
        &deps.handler_config,
        &deps.parameter_store,
        deps.sink.as_ref(),
    )
    .map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing(LogFormat::from_env());

    let config = RuntimeConfig::from_env()?;
    tracing::info!(
        component = "notification_runtime",
        event = "cold_start",
        channel = %config.sink.channel(),
        recipient_parameter = %config.handler.recipient_parameter,
        failure_policy = %config.handler.failure_policy,
    );

    let deps = RuntimeDependencies::load(config).await;
    let deps = &deps;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<SqsEvent>| async move {
        handle_request(event, deps).await
    }))
    .await
}

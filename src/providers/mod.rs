/// Backend adapters and the dispatcher that drives them
///
/// Two request shapes cover every supported provider:
/// - chat-completions (Ollama, OpenAI, Azure)
/// - messages (Anthropic)
///
/// Adapters only build requests and read responses; all network traffic goes
/// through a [`Transport`].

pub mod chat_completions;
pub mod dispatcher;
pub mod messages;
pub mod transport;
pub mod types;

pub use chat_completions::ChatCompletionsAdapter;
pub use dispatcher::{Adapter, Dispatcher, DispatcherBuilder};
pub use messages::MessagesAdapter;
pub use transport::{HttpRequest, ReqwestTransport, Transport};
pub use types::{Message, ProviderKind, Role, Shape};

use lakshya_core::{
    ConversationTranscript, GenerationResponse, Message, Output, Part, Prompt, Role, ToolCall,
};
use serde_json::json;

#[test]
fn transcript_appends_in_order() {
    let mut transcript = ConversationTranscript::new("s-1");
    transcript.push(Message::with_text(Role::User, "one"));
    transcript.push(Message::with_text(Role::Assistant, "two"));
    transcript.push(Message::with_text(Role::User, "three"));

    let texts: Vec<_> = transcript.messages().iter().map(Message::text).collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
    assert_eq!(transcript.last_from(Role::Assistant).unwrap().text(), "two");
}

#[test]
fn recent_returns_tail_oldest_first() {
    let mut transcript = ConversationTranscript::new("s-2");
    for i in 0..5 {
        transcript.push(Message::with_text(Role::User, i.to_string()));
    }

    let recent: Vec<_> = transcript.recent(2).iter().map(Message::text).collect();
    assert_eq!(recent, vec!["3", "4"]);
    assert_eq!(transcript.recent(50).len(), 5);
}

#[test]
fn snapshot_is_independent_of_later_appends() {
    let mut transcript = ConversationTranscript::new("s-3");
    transcript.push(Message::with_text(Role::User, "hello"));
    let saved = transcript.snapshot();
    transcript.push(Message::with_text(Role::Assistant, "hi"));

    assert_eq!(saved.len(), 1);
    assert_eq!(transcript.len(), 2);
}

#[test]
fn model_role_alias_deserializes_as_assistant() {
    let message: Message =
        serde_json::from_value(json!({"role": "model", "content": []})).unwrap();
    assert_eq!(message.role, Role::Assistant);
}

#[test]
fn response_converts_to_assistant_message() {
    let call = ToolCall {
        id: "c1".into(),
        name: "find_exams".into(),
        arguments: json!({"stream": "science"}),
    };
    let response = GenerationResponse {
        outputs: vec![
            Output::Text("Let me check.".into()),
            Output::ToolCalls(vec![call.clone()]),
        ],
    };

    let message = response.to_message();
    assert_eq!(message.role, Role::Assistant);
    assert_eq!(message.text(), "Let me check.");
    assert_eq!(message.tool_calls().collect::<Vec<_>>(), vec![&call]);
    assert_eq!(response.tool_calls(), vec![call]);
    assert!(matches!(message.content[1], Part::ToolCall(_)));
}

#[test]
fn text_prompt_becomes_single_user_message() {
    let prompt = Prompt::from("What is NEET?");
    let messages = prompt.to_messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].text(), "What is NEET?");
}

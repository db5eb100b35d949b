use std::sync::{Arc, Mutex};

use beans::{args, bean, Bean, BeanContainer, BeanRef, InvokeError, Scope, Type, Value};

#[derive(Default)]
struct Journal {
    entries: Mutex<Vec<String>>,
}

#[bean(name = "journal")]
impl Journal {
    #[method]
    fn write(&self, entry: String) {
        self.entries.lock().unwrap().push(entry);
    }

    #[method]
    fn len(&self) -> u32 {
        self.entries.lock().unwrap().len() as u32
    }

    #[method(name = "MinMax")]
    fn min_max(&self, a: i64, b: i64) -> (i64, i64) {
        (a.min(b), a.max(b))
    }

    #[method(name = "Describe")]
    fn describe(&self, value: Value) -> String {
        format!("{:?}", value.get_type())
    }

    #[method(name = "Tag")]
    fn tag(&self, prefix: String, #[variadic] tags: Vec<String>) -> Vec<String> {
        tags.into_iter().map(|tag| format!("{prefix}{tag}")).collect()
    }

    #[method(name = "Find")]
    fn find(&self, needle: String) -> Option<String> {
        let entries = self.entries.lock().unwrap();
        entries.iter().find(|entry| entry.contains(&needle)).cloned()
    }

    // Not exposed.
    fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

#[derive(Debug, PartialEq)]
struct Endpoint {
    host: String,
    port: u16,
}

#[derive(Default)]
struct Client;

#[bean]
impl Client {
    #[method(name = "Url")]
    fn url(&self, endpoint: Arc<Endpoint>) -> String {
        format!("http://{}:{}", endpoint.host, endpoint.port)
    }

    #[method(name = "JournalLen")]
    fn journal_len(&self, journal: BeanRef) -> Vec<Value> {
        journal.invoke("len", vec![]).unwrap()
    }

    #[method(name = "Entries")]
    fn entries(&self, journal: Arc<Journal>) -> u64 {
        journal.entries.lock().unwrap().len() as u64
    }
}

#[derive(Bean, Default)]
#[bean_name = "settings"]
struct Settings {
    #[allow(dead_code)]
    retries: u32,
}

#[test]
fn unit_methods_have_no_results() {
    let journal: BeanRef = Arc::new(Journal::default());
    assert_eq!(journal.invoke("write", args!["first"]).unwrap(), vec![]);
    assert_eq!(journal.invoke("len", args![]).unwrap(), vec![Value::U32(1)]);

    let concrete = journal.downcast_ref::<Journal>().unwrap();
    concrete.clear();
    assert_eq!(journal.invoke("len", args![]).unwrap(), vec![Value::U32(0)]);
}

#[test]
fn tuple_methods_return_each_element() {
    let journal: BeanRef = Arc::new(Journal::default());
    let results = journal.invoke("MinMax", args![9, 3u8]).unwrap();
    assert_eq!(results, vec![Value::I64(3), Value::I64(9)]);
}

#[test]
fn value_parameters_accept_anything_but_nil() {
    let journal: BeanRef = Arc::new(Journal::default());
    let results = journal.invoke("Describe", args![true]).unwrap();
    assert_eq!(results, vec![Value::Str("Some(Bool)".to_string())]);

    assert!(matches!(
        journal.invoke("Describe", args![Value::Nil]),
        Err(InvokeError::TypeMismatch {
            expected: Type::Any,
            actual: None,
            ..
        })
    ));
}

#[test]
fn variadic_tail_follows_fixed_parameters() {
    let journal: BeanRef = Arc::new(Journal::default());
    let results = journal.invoke("Tag", args!["#", "a", "b"]).unwrap();
    assert_eq!(
        results,
        vec![Value::List(vec![
            Value::Str("#a".to_string()),
            Value::Str("#b".to_string()),
        ])]
    );
}

#[test]
fn optional_results_may_be_nil() {
    let journal: BeanRef = Arc::new(Journal::default());
    journal.invoke("write", args!["hello world"]).unwrap();
    assert_eq!(
        journal.invoke("Find", args!["world"]).unwrap(),
        vec![Value::Str("hello world".to_string())]
    );
    assert_eq!(journal.invoke("Find", args!["moon"]).unwrap(), vec![Value::Nil]);
}

#[test]
fn generated_method_table_describes_signatures() {
    let journal: BeanRef = Arc::new(Journal::default());
    assert_eq!(journal.type_name(), "journal");

    let signatures: Vec<_> = journal.methods().iter().map(ToString::to_string).collect();
    assert_eq!(
        signatures,
        vec![
            "fn write(String)",
            "fn len() -> u32",
            "fn MinMax(i64, i64) -> (i64, i64)",
            "fn Describe(Value) -> String",
            "fn Tag(String, ...String) -> Vec<String>",
            "fn Find(String) -> String",
        ]
    );
    assert!(journal.method("clear").is_none());
    assert!(journal.method("Tag").unwrap().is_variadic());
}

#[test]
fn object_parameters_match_their_concrete_type() {
    let client: BeanRef = Arc::new(Client);
    let endpoint = Value::object(Endpoint {
        host: "localhost".to_string(),
        port: 8080,
    });
    assert_eq!(
        client.invoke("Url", vec![endpoint]).unwrap(),
        vec![Value::Str("http://localhost:8080".to_string())]
    );

    let err = client.invoke("Url", args!["localhost"]).unwrap_err();
    assert!(matches!(
        err,
        InvokeError::TypeMismatch {
            position: 0,
            actual: Some(Type::Str),
            ..
        }
    ));
}

#[test]
fn beans_can_be_passed_to_other_beans() {
    let beans = BeanContainer::new();
    beans.register("journal", Journal::default()).unwrap();
    beans.register("client", Client).unwrap();

    let journal = beans.resolve("journal", Scope::Singleton).unwrap();
    journal.invoke("write", args!["entry"]).unwrap();
    let client = beans.resolve("client", Scope::Singleton).unwrap();

    let results = client
        .invoke("JournalLen", vec![Value::Bean(journal.clone())])
        .unwrap();
    assert_eq!(results, vec![Value::List(vec![Value::U32(1)])]);

    let results = client
        .invoke("Entries", vec![Value::Bean(journal)])
        .unwrap();
    assert_eq!(results, vec![Value::U64(1)]);

    let other = beans.resolve("client", Scope::Prototype).unwrap();
    assert!(client.invoke("Entries", vec![Value::Bean(other)]).is_err());
}

#[test]
fn derived_beans_have_no_methods() {
    let beans = BeanContainer::new();
    beans.register("settings", Settings { retries: 3 }).unwrap();

    let settings = beans.resolve("settings", Scope::Singleton).unwrap();
    assert_eq!(settings.type_name(), "settings");
    assert!(settings.methods().is_empty());
    assert!(matches!(
        settings.invoke("Anything", args![]),
        Err(InvokeError::NoSuchMethod { bean: "settings", .. })
    ));
    assert_eq!(beans.resolve_as::<Settings>("settings", Scope::Singleton).unwrap().retries, 0);
}

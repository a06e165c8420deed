//! In-process stand-in for a Redis server, covering the commands `RedisStore` issues.
//!
//! `CLIENT` handshake commands are answered with `+OK` and left out of the
//! command log.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use kvstore::{build_pool, PoolConfig, RedisStore};

enum Entry {
    Str(Vec<u8>),
    Hash(HashMap<Vec<u8>, Vec<u8>>),
    Set(HashSet<Vec<u8>>),
    List(VecDeque<Vec<u8>>),
}

struct Slot {
    entry: Entry,
    expires_at: Option<Instant>,
}

#[derive(Default)]
struct Db {
    keys: HashMap<Vec<u8>, Slot>,
    commands: Vec<String>,
    connections: usize,
    open: usize,
    disabled: HashSet<String>,
    raw: HashMap<String, Vec<u8>>,
    password: Option<Vec<u8>>,
}

impl Db {
    fn live(&mut self, key: &[u8]) -> Option<&mut Slot> {
        let expired = self
            .keys
            .get(key)
            .and_then(|slot| slot.expires_at)
            .is_some_and(|at| at <= Instant::now());
        if expired {
            self.keys.remove(key);
        }
        self.keys.get_mut(key)
    }
}

pub struct FakeRedis {
    port: u16,
    db: Arc<Mutex<Db>>,
}

impl FakeRedis {
    pub fn start() -> Self {
        Self::spawn(None)
    }

    pub fn start_with_password(password: &str) -> Self {
        Self::spawn(Some(password.as_bytes().to_vec()))
    }

    fn spawn(password: Option<Vec<u8>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let db = Arc::new(Mutex::new(Db {
            password,
            ..Db::default()
        }));

        let shared = db.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let db = shared.clone();
                {
                    let mut db = lock(&db);
                    db.connections += 1;
                    db.open += 1;
                }
                thread::spawn(move || {
                    serve(stream, &db);
                    lock(&db).open -= 1;
                });
            }
        });

        FakeRedis { port, db }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            host: "127.0.0.1".to_string(),
            port: self.port,
            max_idle: 4,
            connection_timeout: Duration::from_secs(1),
            ..PoolConfig::default()
        }
    }

    pub fn store_with(&self, config: &PoolConfig) -> RedisStore {
        RedisStore::new(build_pool(config).expect("pool"))
    }

    pub fn store(&self) -> RedisStore {
        self.store_with(&self.pool_config())
    }

    /// Makes the next `name` command get `reply` verbatim, after which the
    /// server hangs up on that connection.
    pub fn reply_raw(&self, name: &str, reply: &[u8]) {
        lock(&self.db).raw.insert(name.to_ascii_uppercase(), reply.to_vec());
    }

    /// Makes the server answer `name` with an unknown-command error.
    pub fn disable(&self, name: &str) {
        lock(&self.db).disabled.insert(name.to_ascii_uppercase());
    }

    /// Command names received so far, upper-cased, in arrival order.
    pub fn commands(&self) -> Vec<String> {
        lock(&self.db).commands.clone()
    }

    /// Connections accepted so far.
    pub fn connections(&self) -> usize {
        lock(&self.db).connections
    }

    /// Connections the client has not closed yet.
    pub fn open_connections(&self) -> usize {
        lock(&self.db).open
    }
}

fn lock(db: &Mutex<Db>) -> MutexGuard<'_, Db> {
    db.lock().expect("fake redis mutex")
}

fn serve(stream: TcpStream, db: &Mutex<Db>) {
    let mut writer = stream.try_clone().expect("clone");
    let mut reader = BufReader::new(stream);
    let mut authed = lock(db).password.is_none();

    while let Ok(args) = read_command(&mut reader) {
        let (response, hang_up) = {
            let mut db = lock(db);
            match raw_reply(&mut db, &args) {
                Some(raw) => (raw, true),
                None => (dispatch(&mut db, &mut authed, &args), false),
            }
        };
        if writer.write_all(&response).and_then(|_| writer.flush()).is_err() || hang_up {
            break;
        }
    }
}

fn raw_reply(db: &mut Db, args: &[Vec<u8>]) -> Option<Vec<u8>> {
    let name = String::from_utf8_lossy(args.first()?).to_ascii_uppercase();
    db.raw.remove(&name)
}

fn dispatch(db: &mut Db, authed: &mut bool, args: &[Vec<u8>]) -> Vec<u8> {
    let Some(name) = args.first() else {
        return error("ERR empty command");
    };
    let name = String::from_utf8_lossy(name).to_ascii_uppercase();
    if name == "CLIENT" {
        return simple("OK");
    }
    db.commands.push(name.clone());

    if name == "AUTH" {
        return match (&db.password, args.get(1)) {
            (Some(expected), Some(given)) if expected == given => {
                *authed = true;
                simple("OK")
            }
            (None, _) => error("ERR AUTH called without any password configured"),
            _ => error("WRONGPASS invalid username-password pair or user is disabled."),
        };
    }
    if !*authed {
        return error("NOAUTH Authentication required.");
    }
    if db.disabled.contains(&name) {
        return error(&format!("ERR unknown command '{name}'"));
    }

    match (name.as_str(), &args[1..]) {
        ("DEL", keys) if !keys.is_empty() => {
            let mut removed = 0;
            for key in keys {
                if db.live(key).is_some() {
                    db.keys.remove(key);
                    removed += 1;
                }
            }
            integer(removed)
        }
        ("GET", [key]) => match db.live(key) {
            None => nil(),
            Some(Slot { entry: Entry::Str(value), .. }) => bulk(value),
            Some(_) => wrong_type(),
        },
        ("SET", [key, value]) => {
            db.keys.insert(key.clone(), slot(Entry::Str(value.clone())));
            simple("OK")
        }
        ("EXPIRE", [key, seconds]) => {
            let Some(seconds) = parse_i64(seconds) else {
                return not_integer();
            };
            match db.live(key) {
                None => integer(0),
                Some(_) if seconds <= 0 => {
                    db.keys.remove(key);
                    integer(1)
                }
                Some(slot) => {
                    slot.expires_at = Some(Instant::now() + Duration::from_secs(seconds as u64));
                    integer(1)
                }
            }
        }
        ("INCR", [key]) => add(db, key, 1),
        ("DECR", [key]) => add(db, key, -1),
        ("HSET", [key, field, value]) => match entry_or_insert(db, key, || Entry::Hash(HashMap::new())) {
            Entry::Hash(hash) => integer(i64::from(hash.insert(field.clone(), value.clone()).is_none())),
            _ => wrong_type(),
        },
        ("HDEL", [key, fields @ ..]) if !fields.is_empty() => {
            let (reply, now_empty) = match db.live(key) {
                None => (integer(0), false),
                Some(Slot { entry: Entry::Hash(hash), .. }) => {
                    let removed = fields.iter().filter(|f| hash.remove(*f).is_some()).count();
                    (integer(removed as i64), hash.is_empty())
                }
                Some(_) => return wrong_type(),
            };
            if now_empty {
                db.keys.remove(key);
            }
            reply
        }
        ("HGET", [key, field]) => match db.live(key) {
            None => nil(),
            Some(Slot { entry: Entry::Hash(hash), .. }) => hash.get(field).map_or_else(nil, |v| bulk(v)),
            Some(_) => wrong_type(),
        },
        ("HKEYS", [key]) | ("HVALS", [key]) => {
            let keys = name == "HKEYS";
            match db.live(key) {
                None => array(&[]),
                Some(Slot { entry: Entry::Hash(hash), .. }) => {
                    let items: Vec<Vec<u8>> = hash
                        .iter()
                        .map(|(k, v)| if keys { k.clone() } else { v.clone() })
                        .collect();
                    array(&items)
                }
                Some(_) => wrong_type(),
            }
        }
        ("SADD", [key, members @ ..]) if !members.is_empty() => {
            match entry_or_insert(db, key, || Entry::Set(HashSet::new())) {
                Entry::Set(set) => integer(members.iter().filter(|m| set.insert((*m).clone())).count() as i64),
                _ => wrong_type(),
            }
        }
        ("SREM", [key, members @ ..]) if !members.is_empty() => {
            let (reply, now_empty) = match db.live(key) {
                None => (integer(0), false),
                Some(Slot { entry: Entry::Set(set), .. }) => {
                    let removed = members.iter().filter(|m| set.remove(*m)).count();
                    (integer(removed as i64), set.is_empty())
                }
                Some(_) => return wrong_type(),
            };
            if now_empty {
                db.keys.remove(key);
            }
            reply
        }
        ("SMEMBERS", [key]) => match db.live(key) {
            None => array(&[]),
            Some(Slot { entry: Entry::Set(set), .. }) => {
                let items: Vec<Vec<u8>> = set.iter().cloned().collect();
                array(&items)
            }
            Some(_) => wrong_type(),
        },
        ("SISMEMBER", [key, member]) => match db.live(key) {
            None => integer(0),
            Some(Slot { entry: Entry::Set(set), .. }) => integer(i64::from(set.contains(member))),
            Some(_) => wrong_type(),
        },
        ("LPUSH", [key, values @ ..]) | ("RPUSH", [key, values @ ..]) if !values.is_empty() => {
            let front = name == "LPUSH";
            match entry_or_insert(db, key, || Entry::List(VecDeque::new())) {
                Entry::List(list) => {
                    for value in values {
                        if front {
                            list.push_front(value.clone());
                        } else {
                            list.push_back(value.clone());
                        }
                    }
                    integer(list.len() as i64)
                }
                _ => wrong_type(),
            }
        }
        ("LPOP", [key]) | ("RPOP", [key]) => {
            let front = name == "LPOP";
            let (reply, now_empty) = match db.live(key) {
                None => (nil(), false),
                Some(Slot { entry: Entry::List(list), .. }) => {
                    let popped = if front { list.pop_front() } else { list.pop_back() };
                    (popped.map_or_else(nil, |v| bulk(&v)), list.is_empty())
                }
                Some(_) => return wrong_type(),
            };
            if now_empty {
                db.keys.remove(key);
            }
            reply
        }
        ("LRANGE", [key, start, end]) => {
            let (Some(start), Some(end)) = (parse_i64(start), parse_i64(end)) else {
                return not_integer();
            };
            match db.live(key) {
                None => array(&[]),
                Some(Slot { entry: Entry::List(list), .. }) => {
                    let len = list.len() as i64;
                    let start = if start < 0 { (len + start).max(0) } else { start };
                    let end = if end < 0 { len + end } else { end.min(len - 1) };
                    if start > end || start >= len {
                        return array(&[]);
                    }
                    let items: Vec<Vec<u8>> = list
                        .iter()
                        .skip(start as usize)
                        .take((end - start + 1) as usize)
                        .cloned()
                        .collect();
                    array(&items)
                }
                Some(_) => wrong_type(),
            }
        }
        ("LREM", [key, count, value]) => {
            let Some(count) = parse_i64(count) else {
                return not_integer();
            };
            let (reply, now_empty) = match db.live(key) {
                None => (integer(0), false),
                Some(Slot { entry: Entry::List(list), .. }) => {
                    let removed = remove_from_list(list, count, value);
                    (integer(removed), list.is_empty())
                }
                Some(_) => return wrong_type(),
            };
            if now_empty {
                db.keys.remove(key);
            }
            reply
        }
        ("LLEN", [key]) => match db.live(key) {
            None => integer(0),
            Some(Slot { entry: Entry::List(list), .. }) => integer(list.len() as i64),
            Some(_) => wrong_type(),
        },
        ("FLUSHDB", []) => {
            db.keys.clear();
            simple("OK")
        }
        ("PING", []) => simple("PONG"),
        _ => error(&format!("ERR unknown command or wrong number of arguments for '{name}'")),
    }
}

fn slot(entry: Entry) -> Slot {
    Slot {
        entry,
        expires_at: None,
    }
}

fn entry_or_insert<'a>(db: &'a mut Db, key: &[u8], empty: impl FnOnce() -> Entry) -> &'a mut Entry {
    if db.live(key).is_none() {
        db.keys.insert(key.to_vec(), slot(empty()));
    }
    &mut db.keys.get_mut(key).expect("just inserted").entry
}

fn add(db: &mut Db, key: &[u8], delta: i64) -> Vec<u8> {
    let current = match db.live(key) {
        None => 0,
        Some(Slot { entry: Entry::Str(value), .. }) => match parse_i64(value) {
            Some(current) => current,
            None => return not_integer(),
        },
        Some(_) => return wrong_type(),
    };
    let Some(next) = current.checked_add(delta) else {
        return error("ERR increment or decrement would overflow");
    };
    match db.live(key) {
        Some(slot) => slot.entry = Entry::Str(next.to_string().into_bytes()),
        None => {
            db.keys.insert(key.to_vec(), slot(Entry::Str(next.to_string().into_bytes())));
        }
    }
    integer(next)
}

fn remove_from_list(list: &mut VecDeque<Vec<u8>>, count: i64, value: &[u8]) -> i64 {
    let limit = if count == 0 { usize::MAX } else { count.unsigned_abs() as usize };
    let mut removed = 0usize;
    let mut kept: VecDeque<Vec<u8>> = VecDeque::with_capacity(list.len());

    if count >= 0 {
        for item in list.drain(..) {
            if removed < limit && item == value {
                removed += 1;
            } else {
                kept.push_back(item);
            }
        }
    } else {
        for item in list.drain(..).rev() {
            if removed < limit && item == value {
                removed += 1;
            } else {
                kept.push_front(item);
            }
        }
    }

    *list = kept;
    removed as i64
}

fn read_command(reader: &mut BufReader<TcpStream>) -> std::io::Result<Vec<Vec<u8>>> {
    let mut line = Vec::new();
    read_line(reader, &mut line)?;
    if line.first() != Some(&b'*') {
        return Err(invalid("expected array"));
    }
    let count = parse_len(&line[1..])?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        read_line(reader, &mut line)?;
        if line.first() != Some(&b'$') {
            return Err(invalid("expected bulk"));
        }
        let len = parse_len(&line[1..])?;
        let mut data = vec![0u8; len + 2];
        reader.read_exact(&mut data)?;
        data.truncate(len);
        args.push(data);
    }
    Ok(args)
}

fn read_line(reader: &mut BufReader<TcpStream>, buf: &mut Vec<u8>) -> std::io::Result<()> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"));
    }
    if !buf.ends_with(b"\r\n") {
        return Err(invalid("invalid line"));
    }
    buf.truncate(buf.len() - 2);
    Ok(())
}

fn parse_len(data: &[u8]) -> std::io::Result<usize> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| invalid("length"))
}

fn parse_i64(data: &[u8]) -> Option<i64> {
    std::str::from_utf8(data).ok()?.parse().ok()
}

fn invalid(msg: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg.to_string())
}

fn simple(message: &str) -> Vec<u8> {
    format!("+{message}\r\n").into_bytes()
}

fn error(message: &str) -> Vec<u8> {
    format!("-{message}\r\n").into_bytes()
}

fn wrong_type() -> Vec<u8> {
    error("WRONGTYPE Operation against a key holding the wrong kind of value")
}

fn not_integer() -> Vec<u8> {
    error("ERR value is not an integer or out of range")
}

fn integer(value: i64) -> Vec<u8> {
    format!(":{value}\r\n").into_bytes()
}

fn bulk(data: &[u8]) -> Vec<u8> {
    let mut buf = format!("${}\r\n", data.len()).into_bytes();
    buf.extend_from_slice(data);
    buf.extend_from_slice(b"\r\n");
    buf
}

fn nil() -> Vec<u8> {
    b"$-1\r\n".to_vec()
}

fn array(items: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = format!("*{}\r\n", items.len()).into_bytes();
    for item in items {
        buf.extend_from_slice(&bulk(item));
    }
    buf
}

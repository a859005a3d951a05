use super::{Metadata, Mode, Stream, StreamError};
use std::io::SeekFrom;

#[test]
fn test_write_rewind_read_roundtrip() {
    let stream = Stream::empty();
    assert_eq!(stream.write(b"hello world").unwrap(), 11);
    assert_eq!(stream.tell().unwrap(), 11);

    stream.rewind().unwrap();
    assert_eq!(stream.read(11).unwrap().as_ref(), b"hello world");
    assert_eq!(stream.read(1).unwrap().as_ref(), b"");
    assert!(stream.eof().unwrap());
}

#[test]
fn test_read_advances_by_amount_returned() {
    let stream = Stream::new(*b"abcdef");
    assert_eq!(stream.read(4).unwrap().as_ref(), b"abcd");
    assert_eq!(stream.tell().unwrap(), 4);
    // short read at the end
    assert_eq!(stream.read(10).unwrap().as_ref(), b"ef");
    assert_eq!(stream.tell().unwrap(), 6);
}

#[test]
fn test_write_overwrites_at_cursor() {
    let stream = Stream::new(*b"hello world");
    stream.seek(SeekFrom::Start(6)).unwrap();
    stream.write(b"earth").unwrap();

    stream.rewind().unwrap();
    assert_eq!(stream.get_contents().unwrap().as_ref(), b"hello earth");

    // overwrite past the end extends
    stream.seek(SeekFrom::Start(6)).unwrap();
    stream.write(b"everybody").unwrap();
    assert_eq!(stream.size().unwrap(), 15);
    stream.rewind().unwrap();
    assert_eq!(stream.get_contents().unwrap().as_ref(), b"hello everybody");
}

#[test]
fn test_append_via_end() {
    let stream = Stream::new(*b"hello");
    stream.end().unwrap();
    stream.write(b" world").unwrap();
    stream.rewind().unwrap();
    assert_eq!(stream.get_contents().unwrap().as_ref(), b"hello world");
}

#[test]
fn test_memory_seek_clamps() {
    let stream = Stream::new(*b"abc");
    stream.seek(SeekFrom::Start(100)).unwrap();
    assert_eq!(stream.tell().unwrap(), 3);

    stream.seek(SeekFrom::Current(-100)).unwrap();
    assert_eq!(stream.tell().unwrap(), 0);

    stream.seek(SeekFrom::End(-1)).unwrap();
    assert_eq!(stream.tell().unwrap(), 2);
}

#[test]
fn test_get_contents_from_cursor() {
    let stream = Stream::new(*b"abcdef");
    stream.seek(SeekFrom::Start(2)).unwrap();
    assert_eq!(stream.get_contents().unwrap().as_ref(), b"cdef");
    // cursor is now at the end
    assert_eq!(stream.get_contents().unwrap().as_ref(), b"");
}

#[test]
fn test_read_only() {
    let stream = Stream::read_only(*b"abc");
    assert!(stream.is_readable());
    assert!(!stream.is_writable());
    assert!(matches!(
        stream.write(b"x").unwrap_err(),
        StreamError::NotWritable
    ));
    assert_eq!(stream.read(3).unwrap().as_ref(), b"abc");
}

#[test]
fn test_search_from_cursor_restores_position() {
    let stream = Stream::new(*b"one two one");
    assert_eq!(stream.search(b"one").unwrap(), Some(0));
    assert_eq!(stream.tell().unwrap(), 0);

    stream.seek(SeekFrom::Start(4)).unwrap();
    assert_eq!(stream.search(b"one").unwrap(), Some(8));
    assert_eq!(stream.tell().unwrap(), 4);

    assert_eq!(stream.search(b"missing").unwrap(), None);
}

#[test]
fn test_prepend_postpend() {
    let stream = Stream::new(*b"<a>{{m}}</a>");
    assert!(stream.prepend(b"X", b"{{m}}").unwrap());
    stream.rewind().unwrap();
    assert_eq!(stream.get_contents().unwrap().as_ref(), b"<a>X{{m}}</a>");

    let stream = Stream::new(*b"<a>{{m}}</a>");
    assert!(stream.postpend(b"X", b"{{m}}").unwrap());
    stream.rewind().unwrap();
    assert_eq!(stream.get_contents().unwrap().as_ref(), b"<a>{{m}}X</a>");

    // anchor absent: signalled, stream untouched
    let stream = Stream::new(*b"<a></a>");
    assert!(!stream.prepend(b"X", b"{{m}}").unwrap());
    stream.rewind().unwrap();
    assert_eq!(stream.get_contents().unwrap().as_ref(), b"<a></a>");
}

#[test]
fn test_metadata_snapshot() {
    let stream = Stream::read_only(*b"abc");
    assert_eq!(
        stream.metadata(),
        Metadata { readable: true, writable: false, seekable: true, size: Some(3) }
    );

    stream.close();
    assert_eq!(
        stream.metadata(),
        Metadata { readable: false, writable: false, seekable: false, size: None }
    );
}

#[test]
fn test_close_poisons_operations() {
    let stream = Stream::new(*b"abc");
    stream.close();
    assert!(!stream.is_readable());
    assert!(!stream.is_writable());
    assert!(!stream.is_seekable());
    assert!(matches!(stream.read(1).unwrap_err(), StreamError::Closed));
    assert!(matches!(stream.write(b"x").unwrap_err(), StreamError::Closed));
    assert!(matches!(stream.seek(SeekFrom::Start(0)).unwrap_err(), StreamError::Closed));
    assert!(matches!(stream.tell().unwrap_err(), StreamError::Closed));
}

#[test]
fn test_detach_memory() {
    let stream = Stream::new(*b"abc");
    assert!(stream.detach().is_none());
    assert!(matches!(stream.read(1).unwrap_err(), StreamError::Closed));
}

#[test]
fn test_clone_shares_cursor() {
    let stream = Stream::new(*b"abcdef");
    let alias = stream.clone();
    assert!(stream.same(&alias));
    assert!(!stream.same(&Stream::new(*b"abcdef")));

    alias.seek(SeekFrom::Start(3)).unwrap();
    assert_eq!(stream.tell().unwrap(), 3);
}

#[test]
fn test_display_fallback() {
    let stream = Stream::new(*b"body text");
    stream.end().unwrap();
    // cursor does not affect Display, and is not moved by it
    assert_eq!(stream.to_string(), "body text");
    assert_eq!(stream.tell().unwrap(), 9);

    stream.close();
    assert_eq!(stream.to_string(), "");
}

#[test]
fn test_file_backed() {
    let path = std::env::temp_dir().join(format!("busta-stream-{}", std::process::id()));
    let file = std::fs::File::options()
        .create(true)
        .truncate(true)
        .read(true)
        .write(true)
        .open(&path)
        .unwrap();

    let stream = Stream::from_file(file, Mode::ReadWrite);
    stream.write(b"on disk").unwrap();
    stream.rewind().unwrap();
    assert_eq!(stream.read(2).unwrap().as_ref(), b"on");
    assert_eq!(stream.get_contents().unwrap().as_ref(), b" disk");
    assert_eq!(stream.size().unwrap(), 7);

    stream.rewind().unwrap();
    assert_eq!(stream.search(b"disk").unwrap(), Some(3));
    assert!(stream.postpend(b"!", b"disk").unwrap());
    assert_eq!(stream.to_string(), "on disk!");

    let file = stream.detach().unwrap();
    drop(file);
    std::fs::remove_file(&path).unwrap();
}

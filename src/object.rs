use crate::ast::Expr;
use crate::scope::ScopeRef;
use std::fmt;
use std::rc::Rc;

/// A runtime value. Objects are immutable after creation; rebinding a name
/// in a scope is the only kind of mutation the language has.
#[derive(Debug, Clone)]
pub enum Object {
    Double(f64),
    Boolean(bool),
    /// Produced only by evaluating an expression list; the consumers
    /// (calls, `do`, arithmetic) take it apart immediately.
    List(Vec<Object>),
    Func(Rc<FuncValue>),
    Nil,
    /// Placeholder bound under a `defn`'s own name while its function
    /// literal is being evaluated. Must never survive as a final result:
    /// closure capture replaces it with the finished function.
    SelfRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    Double,
    Boolean,
    List,
    Func,
    Nil,
    SelfRef,
}

impl fmt::Display for ObjKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjKind::Double => write!(f, "Double"),
            ObjKind::Boolean => write!(f, "Boolean"),
            ObjKind::List => write!(f, "List"),
            ObjKind::Func => write!(f, "Function"),
            ObjKind::Nil => write!(f, "Nil"),
            ObjKind::SelfRef => write!(f, "Self"),
        }
    }
}

impl Object {
    pub fn kind(&self) -> ObjKind {
        match self {
            Object::Double(_) => ObjKind::Double,
            Object::Boolean(_) => ObjKind::Boolean,
            Object::List(_) => ObjKind::List,
            Object::Func(_) => ObjKind::Func,
            Object::Nil => ObjKind::Nil,
            Object::SelfRef => ObjKind::SelfRef,
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Double(a), Object::Double(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::List(a), Object::List(b)) => a == b,
            // Functions are equal only when they are the same object.
            (Object::Func(a), Object::Func(b)) => Rc::ptr_eq(a, b),
            (Object::Nil, Object::Nil) => true,
            (Object::SelfRef, Object::SelfRef) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Double(v) => write!(f, "{}", v),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::List(objs) => {
                write!(f, "(")?;
                for (i, obj) in objs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", obj)?;
                }
                write!(f, ")")
            }
            Object::Func(func) => write!(f, "#<fn [{}]>", func.params.join(" ")),
            Object::Nil => write!(f, "nil"),
            Object::SelfRef => write!(f, "#<self>"),
        }
    }
}

/// A function value: the closure scope captured at the definition site, the
/// parameter names in order, and the unevaluated body.
pub struct FuncValue {
    pub closure: ScopeRef,
    pub params: Vec<String>,
    pub body: Rc<Expr>,
}

// A recursive function's closure holds the function itself; formatting the
// closure would never terminate, so Debug stops at the parameter list.
impl fmt::Debug for FuncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncValue")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

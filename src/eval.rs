use crate::ast::{BindPair, Expr, ExprList};
use crate::error::EvalError;
use crate::object::{FuncValue, Object, ObjKind};
use crate::scope::{Scope, ScopeRef};
use crate::token::TokenType;
use std::collections::HashSet;
use std::rc::Rc;

impl Expr {
    /// Evaluates this expression against a scope, producing a runtime
    /// object or the error that aborted the walk.
    pub fn eval(&self, sc: &ScopeRef) -> Result<Object, EvalError> {
        match self {
            Expr::Nil => Ok(Object::Nil),

            Expr::Ident(name) => sc
                .borrow()
                .get(name)
                .ok_or_else(|| EvalError::Undefined(name.clone())),

            Expr::Num(value) => Ok(Object::Double(*value)),

            Expr::Boolean(b) => Ok(Object::Boolean(*b)),

            Expr::Def { name, value } => {
                let obj = value.eval(sc)?;
                if obj.kind() == ObjKind::Nil {
                    return Err(EvalError::BindNil);
                }
                sc.borrow_mut().insert(name.clone(), obj);
                Ok(Object::Nil)
            }

            Expr::Defn { name, value } => {
                // The function may call itself by name, so the literal is
                // evaluated in a child scope where the name is pre-bound to
                // the self placeholder; closure capture patches the
                // placeholder to the finished function.
                let inner = Scope::new(Some(sc.clone()));
                inner.borrow_mut().insert(name.clone(), Object::SelfRef);
                let obj = value.eval(&inner)?;
                if obj.kind() == ObjKind::Nil {
                    return Err(EvalError::BindNil);
                }
                sc.borrow_mut().insert(name.clone(), obj);
                Ok(Object::Nil)
            }

            Expr::Fn { params, body } => {
                // Free names are whatever stays unresolved with only the
                // parameters in scope; each one is copied out of the
                // definition site into a fresh closure scope.
                let mut unresolved = HashSet::new();
                self.collect_unresolved_names(&Scope::new(None), &mut unresolved)?;

                let closure = Scope::new(None);
                let func = Object::Func(Rc::new(FuncValue {
                    closure: closure.clone(),
                    params: params.clone(),
                    body: Rc::clone(body),
                }));
                for name in unresolved {
                    match sc.borrow().get(&name) {
                        None => return Err(EvalError::Uncaptured(name)),
                        Some(Object::SelfRef) => {
                            closure.borrow_mut().insert(name, func.clone());
                        }
                        Some(obj) => {
                            closure.borrow_mut().insert(name, obj);
                        }
                    }
                }
                Ok(func)
            }

            Expr::Call { func, args } => {
                let obj = func.eval(sc)?;
                let Object::Func(func_val) = obj else {
                    return Err(EvalError::NotCallable(obj.kind()));
                };
                if args.exprs.len() != func_val.params.len() {
                    return Err(EvalError::WrongArgCount {
                        got: args.exprs.len(),
                        want: func_val.params.len(),
                    });
                }
                let arg_objs = eval_list(args, sc)?;
                // Arguments go into a fresh frame chained under the closure
                // rather than into the closure itself, so recursive calls
                // keep their own bindings.
                let frame = Scope::new(Some(func_val.closure.clone()));
                for (param, arg) in func_val.params.iter().zip(arg_objs) {
                    frame.borrow_mut().insert(param.clone(), arg);
                }
                func_val.body.eval(&frame)
            }

            Expr::Do(list) => {
                let objects = eval_list(list, sc)?;
                Ok(objects.into_iter().last().unwrap_or(Object::Nil))
            }

            Expr::If { cond, then, els } => {
                let cond_obj = cond.eval(sc)?;
                let Object::Boolean(b) = cond_obj else {
                    return Err(EvalError::NonBooleanCondition(cond_obj.kind()));
                };
                if b {
                    then.eval(sc)
                } else {
                    els.eval(sc)
                }
            }

            Expr::Binary { op, left, right } => {
                let lhs = left.eval(sc)?;
                let rhs = right.eval(sc)?;
                if lhs.kind() != rhs.kind() {
                    return Err(EvalError::MixedComparison {
                        left: lhs.kind(),
                        right: rhs.kind(),
                    });
                }
                let (Object::Double(v1), Object::Double(v2)) = (&lhs, &rhs) else {
                    return Err(EvalError::NonNumericComparison(lhs.kind()));
                };
                let res = match op {
                    TokenType::Lt => v1 < v2,
                    TokenType::Le => v1 <= v2,
                    TokenType::Gt => v1 > v2,
                    TokenType::Ge => v1 >= v2,
                    TokenType::Eq => v1 == v2,
                    _ => return Err(EvalError::InvalidOperator(*op)),
                };
                Ok(Object::Boolean(res))
            }

            Expr::Multi { op, operands } => {
                let objects = eval_list(operands, sc)?;
                if objects.is_empty() {
                    return Ok(Object::Nil);
                }
                let op_fn: fn(f64, f64) -> f64 = match op {
                    TokenType::Plus => |v1, v2| v1 + v2,
                    TokenType::Minus => |v1, v2| v1 - v2,
                    TokenType::Asterisk => |v1, v2| v1 * v2,
                    TokenType::Slash => |v1, v2| v1 / v2,
                    _ => return Err(EvalError::InvalidOperator(*op)),
                };
                let mut iter = objects.into_iter();
                let mut acc = match iter.next() {
                    Some(Object::Double(v)) => v,
                    Some(obj) => return Err(EvalError::NonNumericOperand(obj.kind())),
                    None => unreachable!(),
                };
                for obj in iter {
                    let Object::Double(v) = obj else {
                        return Err(EvalError::NonNumericOperand(obj.kind()));
                    };
                    acc = op_fn(acc, v);
                }
                Ok(Object::Double(acc))
            }

            Expr::Let { bindings, body } => {
                // One child scope for the whole block; each pair can see
                // the ones bound before it.
                let inner = Scope::new(Some(sc.clone()));
                for binding in bindings {
                    binding.eval(&inner)?;
                }
                body.eval(&inner)
            }
        }
    }

    /// Collects every identifier in this expression that does not resolve
    /// against `sc`. Used with an empty baseline scope (parameters shadowed
    /// in) to find the free names a function literal must capture.
    fn collect_unresolved_names(
        &self,
        sc: &ScopeRef,
        names: &mut HashSet<String>,
    ) -> Result<(), EvalError> {
        match self {
            Expr::Nil | Expr::Num(_) | Expr::Boolean(_) => Ok(()),

            Expr::Ident(name) => {
                if sc.borrow().get(name).is_none() {
                    names.insert(name.clone());
                }
                Ok(())
            }

            // Top-level binds have no business inside a function body.
            Expr::Def { .. } | Expr::Defn { .. } => Err(EvalError::DefInsideFunction),

            Expr::Fn { params, body } => {
                let inner = Scope::new(Some(sc.clone()));
                for param in params {
                    inner.borrow_mut().insert(param.clone(), Object::Nil);
                }
                body.collect_unresolved_names(&inner, names)
            }

            Expr::Call { func, args } => {
                func.collect_unresolved_names(sc, names)?;
                args.collect_unresolved_names(sc, names)
            }

            Expr::Do(list) => list.collect_unresolved_names(sc, names),

            Expr::If { cond, then, els } => {
                cond.collect_unresolved_names(sc, names)?;
                then.collect_unresolved_names(sc, names)?;
                els.collect_unresolved_names(sc, names)
            }

            Expr::Binary { left, right, .. } => {
                left.collect_unresolved_names(sc, names)?;
                right.collect_unresolved_names(sc, names)
            }

            Expr::Multi { operands, .. } => operands.collect_unresolved_names(sc, names),

            Expr::Let { bindings, body } => {
                let inner = Scope::new(Some(sc.clone()));
                for binding in bindings {
                    binding.collect_unresolved_names(&inner, names)?;
                }
                body.collect_unresolved_names(&inner, names)
            }
        }
    }
}

impl ExprList {
    /// Evaluates every expression left to right, collecting the results
    /// into a list object. The first error wins.
    pub fn eval(&self, sc: &ScopeRef) -> Result<Object, EvalError> {
        let mut objects = Vec::with_capacity(self.exprs.len());
        for expr in &self.exprs {
            objects.push(expr.eval(sc)?);
        }
        Ok(Object::List(objects))
    }

    fn collect_unresolved_names(
        &self,
        sc: &ScopeRef,
        names: &mut HashSet<String>,
    ) -> Result<(), EvalError> {
        for expr in &self.exprs {
            expr.collect_unresolved_names(sc, names)?;
        }
        Ok(())
    }
}

impl BindPair {
    /// Evaluates the value in the given scope and binds it there. Unlike
    /// `def`, a let pair may bind nil.
    pub fn eval(&self, sc: &ScopeRef) -> Result<Object, EvalError> {
        let obj = self.value.eval(sc)?;
        sc.borrow_mut().insert(self.name.clone(), obj);
        Ok(Object::Nil)
    }

    fn collect_unresolved_names(
        &self,
        sc: &ScopeRef,
        names: &mut HashSet<String>,
    ) -> Result<(), EvalError> {
        // The value is examined before the name is bound, so a pair can't
        // see itself.
        self.value.collect_unresolved_names(sc, names)?;
        sc.borrow_mut().insert(self.name.clone(), Object::Nil);
        Ok(())
    }
}

fn eval_list(list: &ExprList, sc: &ScopeRef) -> Result<Vec<Object>, EvalError> {
    match list.eval(sc)? {
        Object::List(objects) => Ok(objects),
        obj => unreachable!("expression list evaluated to {}", obj.kind()),
    }
}

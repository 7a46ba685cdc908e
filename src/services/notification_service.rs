use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::cv_submission::CvSubmission;
use crate::models::detailed_application::{DetailedApplication, Stage, StageStatus, GENERAL_APPLICATION};
use crate::services::mail_service::{MailAttachment, Mailer, OutgoingMail};
use crate::services::stage_engine::StageTransition;
use crate::utils::calendar::{CalendarEvent, CALENDAR_CONTENT_TYPE, CALENDAR_FILENAME};
use crate::utils::html::{escape, escape_multiline};
use crate::utils::time::to_display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Applicant,
    Hr,
    HrAndApplicant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SentMessage {
    pub stage: Option<Stage>,
    pub audience: Audience,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DispatchFailure {
    pub stage: Option<Stage>,
    pub audience: Audience,
    pub error: String,
}

/// What happened to each message of a dispatch. Failures are reported to
/// the caller and never undo the change that triggered them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DispatchReport {
    pub sent: Vec<SentMessage>,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    pub fn extend(&mut self, other: DispatchReport) {
        self.sent.extend(other.sent);
        self.failures.extend(other.failures);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone)]
pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    from: String,
    hr_recipients: Vec<String>,
    venue: String,
}

impl NotificationService {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        from: String,
        hr_recipients: Vec<String>,
        venue: String,
    ) -> Self {
        Self {
            mailer,
            from,
            hr_recipients,
            venue,
        }
    }

    /// Sends the applicant and HR messages for one stage that left pending.
    /// Each message is attempted independently.
    pub async fn dispatch_stage_transition(
        &self,
        application: &DetailedApplication,
        transition: &StageTransition,
        now: DateTime<Utc>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        if transition.to.is_pending() {
            return report;
        }
        let stage = Some(transition.stage);

        let applicant = compose_applicant_message(application, transition, &self.venue, now);
        self.deliver(&mut report, stage, Audience::Applicant, applicant).await;

        if let Some(hr) = compose_hr_message(application, transition, &self.hr_recipients, now) {
            self.deliver(&mut report, stage, Audience::Hr, hr).await;
        }

        report
    }

    pub async fn notify_cv_submitted(
        &self,
        submission: &CvSubmission,
        cv: Option<MailAttachment>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mail = compose_cv_received(submission, &self.hr_recipients, cv);
        self.deliver(&mut report, None, Audience::HrAndApplicant, mail).await;
        report
    }

    pub async fn notify_application_received(&self, application: &DetailedApplication) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mail = compose_application_received(application, &self.hr_recipients);
        self.deliver(&mut report, None, Audience::HrAndApplicant, mail).await;
        report
    }

    async fn deliver(
        &self,
        report: &mut DispatchReport,
        stage: Option<Stage>,
        audience: Audience,
        mail: OutgoingMail,
    ) {
        let subject = mail.subject.clone();
        match self.mailer.send(&self.from, mail).await {
            Ok(()) => report.sent.push(SentMessage {
                stage,
                audience,
                subject,
            }),
            Err(err) => {
                tracing::warn!(error = %err, ?audience, %subject, "Notification delivery failed");
                report.failures.push(DispatchFailure {
                    stage,
                    audience,
                    error: err.to_string(),
                });
            }
        }
    }
}

/// The stored interview date, if it has not already gone by. A date kept
/// from an earlier stage is not announced again once it is in the past.
pub fn upcoming_interview(
    application: &DetailedApplication,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    application.interview_date.filter(|date| *date > now)
}

/// The invite for the stage that follows a pass. Needs an upcoming
/// interview date.
pub fn interview_event(
    application: &DetailedApplication,
    transition: &StageTransition,
    venue: &str,
    now: DateTime<Utc>,
) -> Option<CalendarEvent> {
    if transition.to != StageStatus::Passed {
        return None;
    }
    let start = upcoming_interview(application, now)?;
    let next = transition.stage.next_label();
    Some(CalendarEvent::interview(
        format!("{} - {}", next, application.full_name),
        format!(
            "{} for {} ({})",
            next,
            application.full_name,
            application.job_title_or_general()
        ),
        venue,
        start,
    ))
}

pub fn compose_applicant_message(
    application: &DetailedApplication,
    transition: &StageTransition,
    venue: &str,
    now: DateTime<Utc>,
) -> OutgoingMail {
    let job_title = application.job_title_or_general();
    let stage = transition.stage;
    let passed = transition.to == StageStatus::Passed;
    let comment = application.comments.get(stage);

    let subject = if passed {
        format!("Congratulations! Update on your application for {}", job_title)
    } else {
        format!("Update on your application for {}", job_title)
    };

    let mut body = format!(
        "<p>Dear {},</p>",
        escape(&application.full_name)
    );
    if passed {
        body.push_str(&format!(
            "<p>We are pleased to let you know that you have passed the <strong>{}</strong> for <strong>{}</strong>. The next step is the <strong>{}</strong>.</p>",
            stage.label(),
            escape(job_title),
            stage.next_label()
        ));
        if let Some(date) = upcoming_interview(application, now) {
            body.push_str(&format!(
                "<p>Your {} is scheduled for {} at {}. A calendar invitation is attached.</p>",
                stage.next_label(),
                to_display(date),
                escape(venue)
            ));
        }
    } else {
        body.push_str(&format!(
            "<p>Thank you for taking part in the <strong>{}</strong> for <strong>{}</strong>. After careful consideration we will not be moving forward with your application at this time.</p>",
            stage.label(),
            escape(job_title)
        ));
    }
    body.push_str(&format!(
        "<p>Status: <strong>{}</strong></p>",
        if passed { "Passed" } else { "Not Selected" }
    ));
    if !comment.is_empty() {
        body.push_str(&format!("<p>Notes from the interviewer:<br>{}</p>", escape_multiline(comment)));
    }
    body.push_str("<p>Kind regards,<br>The Recruitment Team</p>");

    let attachment = interview_event(application, transition, venue, now).map(|event| MailAttachment {
        filename: CALENDAR_FILENAME.to_string(),
        content_type: CALENDAR_CONTENT_TYPE.to_string(),
        data: event.to_ics(now).into_bytes(),
    });

    OutgoingMail {
        subject,
        recipients: vec![application.email.clone()],
        html_body: body,
        attachment,
    }
}

/// Only produced when an upcoming interview date is set.
pub fn compose_hr_message(
    application: &DetailedApplication,
    transition: &StageTransition,
    hr_recipients: &[String],
    now: DateTime<Utc>,
) -> Option<OutgoingMail> {
    let date = upcoming_interview(application, now)?;
    let stage = transition.stage;
    let subject = format!(
        "{}: {} {} - interview on {}",
        application.full_name,
        stage.label(),
        transition.to,
        date.format("%Y-%m-%d %H:%M UTC")
    );
    let body = format!(
        "<p>Applicant: <strong>{}</strong> ({})</p>\
         <p>Position: {}</p>\
         <p>Stage: {}</p>\
         <p>Outcome: {}</p>\
         <p>Interview time: {}</p>",
        escape(&application.full_name),
        escape(&application.email),
        escape(application.job_title_or_general()),
        stage.label(),
        transition.to,
        to_display(date)
    );
    Some(OutgoingMail {
        subject,
        recipients: hr_recipients.to_vec(),
        html_body: body,
        attachment: None,
    })
}

pub fn compose_cv_received(
    submission: &CvSubmission,
    hr_recipients: &[String],
    cv: Option<MailAttachment>,
) -> OutgoingMail {
    let job_title = submission.job_title.as_deref().unwrap_or(GENERAL_APPLICATION);
    let mut recipients = hr_recipients.to_vec();
    recipients.push(submission.applicant_email.clone());
    OutgoingMail {
        subject: format!("New CV Submission for {}", job_title),
        recipients,
        html_body: format!(
            "<p>A new CV has been received.</p>\
             <p>Position: {}</p>\
             <p>Applicant: {} ({})</p>\
             <p>Department: {}</p>\
             <p>Submitted: {}</p>",
            escape(job_title),
            escape(&submission.applicant_name),
            escape(&submission.applicant_email),
            escape(&submission.department),
            to_display(submission.submitted_at)
        ),
        attachment: cv,
    }
}

pub fn compose_application_received(
    application: &DetailedApplication,
    hr_recipients: &[String],
) -> OutgoingMail {
    let job_title = application.job_title_or_general();
    let mut recipients = hr_recipients.to_vec();
    recipients.push(application.email.clone());
    OutgoingMail {
        subject: format!("Detailed Application for {}", job_title),
        recipients,
        html_body: format!(
            "<p>A detailed application has been received.</p>\
             <p>Position: {}</p>\
             <p>Applicant: {} ({}, {})</p>\
             <p>Cover letter:<br>{}</p>",
            escape(job_title),
            escape(&application.full_name),
            escape(&application.email),
            escape(&application.phone_number),
            escape_multiline(&application.cover_letter)
        ),
        attachment: None,
    }
}

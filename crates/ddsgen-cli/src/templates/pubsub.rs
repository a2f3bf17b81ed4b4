//! Topic data type plus the example publisher, subscriber and entry point.

use super::cpp::{close_namespaces, dependency_stems, idl_name, open_namespaces};
use super::naming::header_guard;
use super::{UnitAttributes, banner, group, require_topic};
use crate::error::GenerateResult;
use ddsgen_core::{Context, StructTypeCode};

pub fn pubsub_type_header(unit: &UnitAttributes<'_>) -> GenerateResult<String> {
    let ctx = unit.ctx;
    let topic = require_topic(unit, group::PUBSUB_TYPE_HEADER)?;
    let guard = header_guard(ctx, "PubSubTypes");
    let class = format!("{}PubSubType", topic.name());
    let export = if ctx.flags().export_symbols {
        " eProsima_user_DllExport"
    } else {
        ""
    };

    let mut out = String::new();
    banner(&mut out, "//", &idl_name(ctx));
    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
    out.push_str("#include <fastrtps/config.h>\n#include <fastrtps/TopicDataType.h>\n\n");
    out.push_str(&format!("#include \"{}.h\"\n", ctx.filename()));
    for dep in dependency_stems(ctx) {
        out.push_str(&format!("#include \"{dep}PubSubTypes.h\"\n"));
    }
    out.push_str(&format!(
        "\n#if !defined(GEN_API_VER) || (GEN_API_VER != 1)\n#error Generated {} is not compatible \
            with current installed Fast-RTPS. Please, regenerate it with ddsgen.\n#endif\n\n",
        ctx.filename()
    ));

    open_namespaces(&mut out, topic.scope());
    out.push_str(&format!(
        "/*!\n * @brief This class represents the TopicDataType of the type {} defined by the user \
            in the IDL file.\n * @ingroup {}\n */\n",
        topic.name(),
        ctx.filename_upper()
    ));
    out.push_str(&format!(
        "class{export} {class} : public eprosima::fastrtps::TopicDataType\n{{\npublic:\n"
    ));
    out.push_str(&format!("    typedef {} type;\n\n", topic.name()));
    out.push_str(&format!("    {class}();\n    virtual ~{class}();\n"));
    out.push_str("    virtual bool serialize(void *data, \
        eprosima::fastrtps::rtps::SerializedPayload_t *payload) override;\n");
    out.push_str("    virtual bool deserialize(eprosima::fastrtps::rtps::SerializedPayload_t \
        *payload, void *data) override;\n");
    out.push_str("    virtual std::function<uint32_t()> getSerializedSizeProvider(void* data) \
        override;\n");
    out.push_str("    virtual bool getKey(void *data, eprosima::fastrtps::rtps::InstanceHandle_t \
        *ihandle, bool force_md5 = false) override;\n");
    out.push_str("    virtual void* createData() override;\n");
    out.push_str("    virtual void deleteData(void * data) override;\n");
    out.push_str("    MD5 m_md5;\n    unsigned char* m_keyBuffer;\n};\n");
    close_namespaces(&mut out, topic.scope());

    out.push_str(&format!("\n#endif // {guard}\n"));
    Ok(out)
}

pub fn pubsub_type_source(unit: &UnitAttributes<'_>) -> GenerateResult<String> {
    let ctx = unit.ctx;
    let topic = require_topic(unit, group::PUBSUB_TYPE_SOURCE)?;
    let class = format!("{}PubSubType", topic.scoped_name());
    let ctor = format!("{}PubSubType", topic.name());
    let data = topic.scoped_name();
    // Fusion payloads carry plain CDR without the encapsulation header.
    let (cdr_mode, encapsulation) = if ctx.flags().fusion {
        ("eprosima::fastcdr::Cdr::CORBA_CDR", false)
    } else {
        ("eprosima::fastcdr::Cdr::DDS_CDR", true)
    };

    let mut out = String::new();
    banner(&mut out, "//", &idl_name(ctx));
    out.push_str("#include <fastcdr/FastBuffer.h>\n#include <fastcdr/Cdr.h>\n\n");
    out.push_str(&format!("#include \"{}PubSubTypes.h\"\n\n", ctx.filename()));
    out.push_str("using namespace eprosima::fastrtps;\nusing namespace eprosima::fastrtps::rtps;\n\
        \n");

    out.push_str(&format!("{class}::{ctor}()\n{{\n"));
    out.push_str(&format!("    setName(\"{data}\");\n"));
    out.push_str(&format!(
        "    m_typeSize = static_cast<uint32_t>({data}::getMaxCdrSerializedSize()) + 4 \
            /*encapsulation*/;\n"
    ));
    out.push_str(&format!(
        "    m_isGetKeyDefined = {data}::isKeyDefined();\n    size_t keyLength = \
            {data}::getKeyMaxCdrSerializedSize() > 16 ? {data}::getKeyMaxCdrSerializedSize() : 16;\
            \n"
    ));
    out.push_str("    m_keyBuffer = reinterpret_cast<unsigned char*>(malloc(keyLength));\n    \
        memset(m_keyBuffer, 0, keyLength);\n}\n\n");

    out.push_str(&format!(
        "{class}::~{ctor}()\n{{\n    if(m_keyBuffer!=nullptr)\n        free(m_keyBuffer);\n}}\n\n"
    ));

    out.push_str(&format!(
        "bool {class}::serialize(void *data, SerializedPayload_t *payload)\n{{\n    {data} *p_type \
            = static_cast<{data}*>(data);\n"
    ));
    out.push_str("    eprosima::fastcdr::FastBuffer \
        fastbuffer(reinterpret_cast<char*>(payload->data), payload->max_size);\n");
    out.push_str(&format!(
        "    eprosima::fastcdr::Cdr ser(fastbuffer, eprosima::fastcdr::Cdr::DEFAULT_ENDIAN, \
            {cdr_mode});\n"
    ));
    out.push_str("    payload->encapsulation = ser.endianness() == \
        eprosima::fastcdr::Cdr::BIG_ENDIANNESS ? CDR_BE : CDR_LE;\n\n    try\n    {\n");
    if encapsulation {
        out.push_str("        ser.serialize_encapsulation();\n");
    }
    out.push_str("        p_type->serialize(ser);\n    }\n    \
        catch(eprosima::fastcdr::exception::NotEnoughMemoryException& /*exception*/)\n    {\
        \n        return false;\n    }\n\n");
    out.push_str("    payload->length = static_cast<uint32_t>(ser.getSerializedDataLength());\n    \
        return true;\n}\n\n");

    out.push_str(&format!(
        "bool {class}::deserialize(SerializedPayload_t* payload, void* data)\n{{\n    {data}* \
            p_type = static_cast<{data}*>(data);\n"
    ));
    out.push_str("    eprosima::fastcdr::FastBuffer \
        fastbuffer(reinterpret_cast<char*>(payload->data), payload->length);\n");
    out.push_str(&format!(
        "    eprosima::fastcdr::Cdr deser(fastbuffer, eprosima::fastcdr::Cdr::DEFAULT_ENDIAN, \
            {cdr_mode});\n\n    try\n    {{\n"
    ));
    if encapsulation {
        out.push_str("        deser.read_encapsulation();\n        payload->encapsulation = \
            deser.endianness() == eprosima::fastcdr::Cdr::BIG_ENDIANNESS ? CDR_BE : CDR_LE;\n");
    }
    out.push_str("        p_type->deserialize(deser);\n    }\n    \
        catch(eprosima::fastcdr::exception::NotEnoughMemoryException& /*exception*/)\n    {\
        \n        return false;\n    }\n\n    return true;\n}\n\n");

    out.push_str(&format!(
        "std::function<uint32_t()> {class}::getSerializedSizeProvider(void* data)\n{{\n    return \
            [data]() -> uint32_t\n    {{\n        return \
            static_cast<uint32_t>(type::getCdrSerializedSize(*static_cast<{data}*>(data))) + 4 \
            /*encapsulation*/;\n    }};\n}}\n\n"
    ));

    out.push_str(&format!(
        "void* {class}::createData()\n{{\n    return reinterpret_cast<void*>(new {data}());\n}}\n\n"
    ));
    out.push_str(&format!(
        "void {class}::deleteData(void* data)\n{{\n    delete(reinterpret_cast<{data}*>(data));\n}}\
            \n\n"
    ));

    out.push_str(&format!(
        "bool {class}::getKey(void *data, InstanceHandle_t* handle, bool force_md5)\n{{\n    \
            if(!m_isGetKeyDefined)\n        return false;\n\n    {data}* p_type = \
            static_cast<{data}*>(data);\n"
    ));
    out.push_str(&format!(
        "    eprosima::fastcdr::FastBuffer fastbuffer(reinterpret_cast<char*>(m_keyBuffer), \
            {data}::getKeyMaxCdrSerializedSize());\n"
    ));
    out.push_str("    eprosima::fastcdr::Cdr ser(fastbuffer, \
        eprosima::fastcdr::Cdr::BIG_ENDIANNESS);\n    p_type->serializeKey(ser);\n");
    out.push_str(&format!(
        "    if(force_md5 || {data}::getKeyMaxCdrSerializedSize() > 16)\n    {{\n        \
            m_md5.init();\n        m_md5.update(m_keyBuffer, static_cast<unsigned \
            int>(ser.getSerializedDataLength()));\n        m_md5.finalize();\n        for(uint8_t \
            i = 0; i < 16; ++i)\n        {{\n            handle->value[i] = m_md5.digest[i];\
            \n        }}\n    }}\n"
    ));
    out.push_str("    else\n    {\n        for(uint8_t i = 0; i < 16; ++i)\n        {\n            \
        handle->value[i] = m_keyBuffer[i];\n        }\n    }\n    return true;\n}\n");
    Ok(out)
}

pub fn publisher_header(unit: &UnitAttributes<'_>) -> GenerateResult<String> {
    endpoint_header(unit, Endpoint::Publisher)
}

pub fn publisher_source(unit: &UnitAttributes<'_>) -> GenerateResult<String> {
    let ctx = unit.ctx;
    let topic = require_topic(unit, Endpoint::Publisher.group(false))?;
    let class = format!("{}Publisher", ctx.filename());
    let data = topic.scoped_name();

    let mut out = endpoint_source_prologue(ctx, Endpoint::Publisher);
    out.push_str(&format!(
        "{class}::{class}() : mp_participant(nullptr), mp_publisher(nullptr) {{}}\n\
            \n{class}::~{class}() {{ Domain::removeParticipant(mp_participant); }}\n\n"
    ));
    out.push_str(&format!("bool {class}::init()\n{{\n"));
    push_participant(&mut out, ctx, "publisher");
    out.push_str("    PublisherAttributes Wparam;\n    Wparam.topic.topicKind = ");
    out.push_str(topic_kind(topic));
    out.push_str(&format!(
        ";\n    Wparam.topic.topicDataType = myType.getName();\n    Wparam.topic.topicName \
            = \"{}PubSubTopic\";\n",
        topic.name()
    ));
    out.push_str("    mp_publisher = Domain::createPublisher(mp_participant, Wparam, \
        static_cast<PublisherListener*>(&m_listener));\n    if(mp_publisher == nullptr)\n        \
        return false;\n\n    std::cout << \"Publisher created, waiting for Subscribers.\" << \
        std::endl;\n    return true;\n}\n\n");

    out.push_str(&format!(
        "void {class}::PubListener::onPublicationMatched(Publisher* pub, MatchingInfo& info)\n{{\
            \n    (void)pub;\n\n    if (info.status == MATCHED_MATCHING)\n    {{\n        \
            n_matched++;\n        std::cout << \"Publisher matched\" << std::endl;\n    }}\n    \
            else\n    {{\n        n_matched--;\n        std::cout << \"Publisher unmatched\" << \
            std::endl;\n    }}\n}}\n\n"
    ));

    out.push_str(&format!("void {class}::run()\n{{\n"));
    out.push_str("    while(m_listener.n_matched == 0)\n    {\n        eClock::my_sleep(250);\n    \
        }\n\n");
    out.push_str(&format!("    // Publication code\n\n    {data} st;\n\n"));
    out.push_str("    /* Initialize your structure here */\n\n    int msgsent = 0;\n    char ch = \
        'y';\n    do\n    {\n        if(ch == 'y')\n        {\n            \
        mp_publisher->write(&st);  ++msgsent;\n            std::cout << \"Sending sample, count=\" \
        << msgsent << \", send another sample?(y-yes,n-stop): \";\n        }\n        else if(ch \
        == 'n')\n        {\n            std::cout << \"Stopping execution \" << std::endl;\
        \n            break;\n        }\n        else\n        {\n            std::cout \
        << \"Command \" << ch << \" not recognized, please enter \\\"y/n\\\":\";\n        }\n    } \
        while(std::cin >> ch);\n}\n");
    Ok(out)
}

pub fn subscriber_header(unit: &UnitAttributes<'_>) -> GenerateResult<String> {
    endpoint_header(unit, Endpoint::Subscriber)
}

pub fn subscriber_source(unit: &UnitAttributes<'_>) -> GenerateResult<String> {
    let ctx = unit.ctx;
    let topic = require_topic(unit, Endpoint::Subscriber.group(false))?;
    let class = format!("{}Subscriber", ctx.filename());
    let data = topic.scoped_name();

    let mut out = endpoint_source_prologue(ctx, Endpoint::Subscriber);
    out.push_str(&format!(
        "{class}::{class}() : mp_participant(nullptr), mp_subscriber(nullptr) {{}}\n\
            \n{class}::~{class}() {{ Domain::removeParticipant(mp_participant); }}\n\n"
    ));
    out.push_str(&format!("bool {class}::init()\n{{\n"));
    push_participant(&mut out, ctx, "subscriber");
    out.push_str("    SubscriberAttributes Rparam;\n    Rparam.topic.topicKind = ");
    out.push_str(topic_kind(topic));
    out.push_str(&format!(
        ";\n    Rparam.topic.topicDataType = myType.getName();\n    Rparam.topic.topicName \
            = \"{}PubSubTopic\";\n",
        topic.name()
    ));
    out.push_str("    mp_subscriber = Domain::createSubscriber(mp_participant, Rparam, \
        static_cast<SubscriberListener*>(&m_listener));\n    if(mp_subscriber == nullptr)\n        \
        return false;\n\n    return true;\n}\n\n");

    out.push_str(&format!(
        "void {class}::SubListener::onSubscriptionMatched(Subscriber* sub, MatchingInfo& info)\n{{\
            \n    (void)sub;\n\n    if (info.status == MATCHED_MATCHING)\n    {{\n        \
            n_matched++;\n        std::cout << \"Subscriber matched\" << std::endl;\n    }}\n    \
            else\n    {{\n        n_matched--;\n        std::cout << \"Subscriber unmatched\" << \
            std::endl;\n    }}\n}}\n\n"
    ));
    out.push_str(&format!(
        "void {class}::SubListener::onNewDataMessage(Subscriber* sub)\n{{\n    // Take data\n    \
            {data} st;\n\n    if(sub->takeNextData(&st, &m_info))\n    {{\n        \
            if(m_info.sampleKind == ALIVE)\n        {{\n            // Print your structure data \
            here.\n            ++n_msg;\n            std::cout << \"Sample received, count=\" << \
            n_msg << std::endl;\n        }}\n    }}\n}}\n\n"
    ));
    out.push_str(&format!(
        "void {class}::run()\n{{\n    std::cout << \"Waiting for Data, press Enter to stop the \
            Subscriber. \" << std::endl;\n    std::cin.ignore();\n    std::cout << \"Shutting down \
            the Subscriber.\" << std::endl;\n}}\n"
    ));
    Ok(out)
}

pub fn pubsub_main(unit: &UnitAttributes<'_>) -> GenerateResult<String> {
    let ctx = unit.ctx;
    require_topic(unit, group::PUBSUB_MAIN)?;
    let name = ctx.filename();

    let mut out = String::new();
    banner(&mut out, "//", &idl_name(ctx));
    out.push_str(&format!(
        "#include \"{name}Publisher.h\"\n#include \"{name}Subscriber.h\"\n\n#include \
            <fastrtps/Domain.h>\n#include <fastrtps/log/Log.h>\n\nusing namespace eprosima;\nusing \
            namespace eprosima::fastrtps;\n\n"
    ));
    out.push_str("int main(int argc, char** argv)\n{\n    std::cout << \"Starting \" << std::endl;\
        \n    int type = 1;\n\n");
    out.push_str("    if(argc == 2)\n    {\n        if(strcmp(argv[1], \"publisher\") == 0)\
        \n        {\n            type = 1;\n        }\n        else \
        if(strcmp(argv[1], \"subscriber\") == 0)\n        {\n            type = 2;\n        }\n    \
        }\n    else\n    {\n        std::cout << \"publisher OR subscriber argument needed\" << \
        std::endl;\n        Log::Reset();\n        return 0;\n    }\n\n");
    out.push_str(&format!(
        "    switch(type)\n    {{\n        case 1:\n        {{\n            {name}Publisher mypub;\
            \n            if (mypub.init())\n            {{\n                mypub.run();\
            \n            }}\n            break;\n        }}\n        case 2:\n        {{\
            \n            {name}Subscriber mysub;\n            if (mysub.init())\n            {{\
            \n                mysub.run();\n            }}\n            break;\n        }}\n    }}\
            \n\n"
    ));
    out.push_str("    Domain::stopAll();\n    Log::Reset();\n    return 0;\n}\n");
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Publisher,
    Subscriber,
}

impl Endpoint {
    fn as_str(self) -> &'static str {
        match self {
            Endpoint::Publisher => "Publisher",
            Endpoint::Subscriber => "Subscriber",
        }
    }

    fn group(self, header: bool) -> &'static str {
        match (self, header) {
            (Endpoint::Publisher, true) => group::PUBLISHER_HEADER,
            (Endpoint::Publisher, false) => group::PUBLISHER_SOURCE,
            (Endpoint::Subscriber, true) => group::SUBSCRIBER_HEADER,
            (Endpoint::Subscriber, false) => group::SUBSCRIBER_SOURCE,
        }
    }
}

fn endpoint_header(unit: &UnitAttributes<'_>, endpoint: Endpoint) -> GenerateResult<String> {
    let ctx = unit.ctx;
    let topic = require_topic(unit, endpoint.group(true))?;
    let role = endpoint.as_str();
    let class = format!("{}{role}", ctx.filename());
    let guard = header_guard(ctx, role);

    let mut out = String::new();
    banner(&mut out, "//", &idl_name(ctx));
    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
    out.push_str(&format!(
        "#include \"{}PubSubTypes.h\"\n\n#include <fastrtps/fastrtps_fwd.h>\n#include \
            <fastrtps/{}/{role}Listener.h>\n",
        ctx.filename(),
        role.to_lowercase()
    ));
    if endpoint == Endpoint::Subscriber {
        out.push_str("#include <fastrtps/subscriber/SampleInfo.h>\n");
    }
    out.push('\n');

    out.push_str(&format!(
        "class {class}\n{{\npublic:\n    {class}();\n    virtual ~{class}();\n    bool init();\
            \n    void run();\n\nprivate:\n"
    ));
    out.push_str(&format!(
        "    eprosima::fastrtps::Participant *mp_participant;\n    eprosima::fastrtps::{role} \
            *mp_{};\n\n",
        role.to_lowercase()
    ));

    match endpoint {
        Endpoint::Publisher => out.push_str(
            "    class PubListener : public eprosima::fastrtps::PublisherListener\n    {\n    \
                public:\n        PubListener() : n_matched(0) {};\n        ~PubListener() {};\
                \n        void onPublicationMatched(eprosima::fastrtps::Publisher* pub, \
                eprosima::fastrtps::rtps::MatchingInfo& info);\n        int n_matched;\n    } \
                m_listener;\n",
        ),
        Endpoint::Subscriber => out.push_str(
            "    class SubListener : public eprosima::fastrtps::SubscriberListener\n    {\n    \
                public:\n        SubListener() : n_matched(0), n_msg(0) {};\n        \
                ~SubListener() {};\n        void \
                onSubscriptionMatched(eprosima::fastrtps::Subscriber* sub, \
                eprosima::fastrtps::rtps::MatchingInfo& info);\n        void \
                onNewDataMessage(eprosima::fastrtps::Subscriber* sub);\n        \
                eprosima::fastrtps::SampleInfo_t m_info;\n        int n_matched;\n        int \
                n_msg;\n    } m_listener;\n",
        ),
    }

    out.push_str(&format!("    {}PubSubType myType;\n}};\n\n", topic.scoped_name()));
    out.push_str(&format!("#endif // {guard}\n"));
    Ok(out)
}

fn endpoint_source_prologue(ctx: &Context, endpoint: Endpoint) -> String {
    let role = endpoint.as_str();
    let lower = role.to_lowercase();
    let mut out = String::new();
    banner(&mut out, "//", &idl_name(ctx));
    out.push_str(&format!(
        "#include <fastrtps/participant/Participant.h>\n#include \
            <fastrtps/attributes/ParticipantAttributes.h>\n#include \
            <fastrtps/attributes/{role}Attributes.h>\n#include <fastrtps/{lower}/{role}.h>\
            \n#include <fastrtps/Domain.h>\n#include <fastrtps/utils/eClock.h>\n\n"
    ));
    out.push_str(&format!("#include \"{}{role}.h\"\n\n", ctx.filename()));
    out.push_str("using namespace eprosima::fastrtps;\nusing namespace eprosima::fastrtps::rtps;\n\
        \n");
    out
}

fn push_participant(out: &mut String, ctx: &Context, role: &str) {
    out.push_str(&format!(
        "    // Create RTPSParticipant\n\n    ParticipantAttributes PParam;\n    \
            PParam.rtps.builtin.domainId = 0;\n    PParam.rtps.builtin.leaseDuration = \
            c_TimeInfinite;\n    PParam.rtps.setName(\"Participant_{role}\");\n\n    \
            mp_participant = Domain::createParticipant(PParam);\n    if(mp_participant == nullptr)\
            \n    {{\n        return false;\n    }}\n\n    // Register the type\n\n    \
            Domain::registerType(mp_participant, static_cast<TopicDataType*>(&myType));\n\n    // \
            Create {role} of {}\n\n",
        ctx.filename()
    ));
}

fn topic_kind(topic: &StructTypeCode) -> &'static str {
    if topic.has_identity_key() {
        "WITH_KEY"
    } else {
        "NO_KEY"
    }
}
